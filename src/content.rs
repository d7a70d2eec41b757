//! Content discovery and the in-memory item store.
//!
//! Walks the input directory, splits front matter off every template file and
//! produces a [`ContentStore`] the collection builder queries.
//!
//! ## Directory Structure
//!
//! ```text
//! src/                             # dir.input
//! ├── index.njk                    # Item, url "/"
//! ├── _includes/                   # Skipped (dir.includes)
//! │   └── base.njk
//! ├── blog/                        # Matched by collections.posts_glob
//! │   ├── 2024-01-first-post.md
//! │   └── drafts/
//! │       └── undated.md
//! └── clqms/
//!     ├── intro.md                 # tags: clqms, order: 1
//!     └── roadmap.md               # tags: clqms, no order → sorts last
//! ```
//!
//! ## Front Matter
//!
//! A markdown-style metadata block at the very top of the file: `---` fences
//! hold YAML, `+++` fences hold TOML. Either way the result must be a map. A
//! block that fails to parse is logged and treated as empty; discovery never
//! aborts on bad content, only on I/O failures reading the tree itself.
//!
//! ## Field Mapping
//!
//! - `date`: front matter `date`; `"Last Modified"` / `"Created"` or a missing
//!   value use the file's timestamps. Unparseable text becomes an invalid date.
//! - `tags`: a single string or a list of strings.
//! - `title`: front matter `title`, else the file stem.
//! - `url`: front matter `permalink`, else `/<dir>/<stem>/`.

use crate::config::SiteConfig;
use crate::types::{ContentItem, ItemDate};
use chrono::{DateTime, Utc};
use glob::{MatchOptions, Pattern};
use log::{debug, warn};
use pulldown_cmark::{Event, MetadataBlockKind, Options, Parser, Tag, TagEnd};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input directory not found: {0}")]
    MissingInput(PathBuf),
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Snapshot of every discovered item.
///
/// Items are kept in default collection order: oldest first, invalid dates
/// after valid ones, input path breaking ties. Every query returns items in
/// this order, so it is the "encounter order" that stable sorts preserve.
#[derive(Debug, Default)]
pub struct ContentStore {
    items: Vec<ContentItem>,
}

impl ContentStore {
    pub fn new(mut items: Vec<ContentItem>) -> Self {
        items.sort_by(|a, b| {
            let by_date = match (a.date.value(), b.date.value()) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_date.then_with(|| a.input_path.cmp(&b.input_path))
        });
        Self { items }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items whose input path matches `pattern`.
    ///
    /// `**` spans directories, `*` does not. An invalid pattern matches
    /// nothing and is logged.
    pub fn filtered_by_glob(&self, pattern: &str) -> Vec<&ContentItem> {
        let pattern = match Pattern::new(pattern) {
            Ok(p) => p,
            Err(e) => {
                warn!("invalid glob '{pattern}': {e}");
                return Vec::new();
            }
        };
        self.items
            .iter()
            .filter(|item| pattern.matches_with(&item.input_path, GLOB_OPTIONS))
            .collect()
    }

    /// Items carrying `tag` (exact match).
    pub fn filtered_by_tag(&self, tag: &str) -> Vec<&ContentItem> {
        self.items.iter().filter(|item| item.has_tag(tag)).collect()
    }
}

/// Scan `<root>/<dir.input>` into a content store.
pub fn scan(root: &Path, config: &SiteConfig) -> Result<ContentStore, ScanError> {
    let input = root.join(&config.dir.input);
    if !input.is_dir() {
        return Err(ScanError::MissingInput(input));
    }
    let output = root.join(&config.dir.output);
    let reserved: Vec<PathBuf> = config
        .dir
        .reserved()
        .iter()
        .map(|dir| input.join(dir))
        .collect();

    let walker = WalkDir::new(&input)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !(is_hidden(e)
                    || e.path() == output.as_path()
                    || reserved.iter().any(|r| e.path() == r.as_path()))
        });

    let mut items = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_template = entry
            .path()
            .extension()
            .map(|ext| config.is_template_format(&ext.to_string_lossy()))
            .unwrap_or(false);
        if !is_template {
            continue;
        }
        let item = match read_item(entry.path(), &input) {
            Ok(item) => item,
            Err(e) => {
                warn!("{}: skipped, {e}", entry.path().display());
                continue;
            }
        };
        debug!("found {} ({})", item.input_path, item.date);
        items.push(item);
    }

    Ok(ContentStore::new(items))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Read one template file into a content item.
///
/// Bytes that are not UTF-8 are replaced rather than failing the scan.
fn read_item(path: &Path, input: &Path) -> std::io::Result<ContentItem> {
    let input_path = relative_slash_path(path, input);
    let text = match String::from_utf8(fs::read(path)?) {
        Ok(text) => text,
        Err(e) => {
            warn!("{input_path}: not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    let (data, content) = split_front_matter(&text, &input_path);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let title = data
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| stem.clone());

    let url = data
        .get("permalink")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| derive_url(&input_path, &stem));

    let date = resolve_date(data.get("date"), path, &input_path);
    let tags = parse_tags(data.get("tags"));

    Ok(ContentItem {
        input_path,
        url,
        title,
        date,
        tags,
        data,
        content: content.to_string(),
    })
}

fn relative_slash_path(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `blog/post.md` → `/blog/post/`; `blog/index.md` → `/blog/`; `index.njk` → `/`.
fn derive_url(input_path: &str, stem: &str) -> String {
    let dir = match input_path.rfind('/') {
        Some(pos) => &input_path[..pos],
        None => "",
    };
    let mut url = String::from("/");
    if !dir.is_empty() {
        url.push_str(dir);
        url.push('/');
    }
    if stem != "index" {
        url.push_str(stem);
        url.push('/');
    }
    url
}

// ============================================================================
// Front matter
// ============================================================================

/// Split a file into its front matter map and body.
///
/// Files without a metadata block get an empty map and their full text as body.
pub fn split_front_matter<'a>(text: &'a str, origin: &str) -> (Map<String, Value>, &'a str) {
    if let Some(body) = empty_fence_body(text) {
        return (Map::new(), body);
    }
    let options = Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
        | Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS;

    let mut block = String::new();
    let mut kind = None;
    let mut body_start = 0;
    for (event, range) in Parser::new_ext(text, options).into_offset_iter() {
        match event {
            Event::Start(Tag::MetadataBlock(k)) if range.start == 0 => kind = Some(k),
            Event::Text(t) if kind.is_some() => block.push_str(&t),
            Event::End(TagEnd::MetadataBlock(_)) => {
                body_start = range.end;
                break;
            }
            _ => break,
        }
    }

    let Some(kind) = kind else {
        return (Map::new(), text);
    };
    let body = text[body_start..].trim_start_matches(['\r', '\n']);

    let parsed = match kind {
        MetadataBlockKind::YamlStyle => serde_yaml::from_str::<Value>(&block)
            .map_err(|e| e.to_string()),
        MetadataBlockKind::PlusesStyle => toml::from_str::<toml::Table>(&block)
            .map(|table| toml_to_json(toml::Value::Table(table)))
            .map_err(|e| e.to_string()),
    };

    let data = match parsed {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Map::new(),
        Ok(_) => {
            warn!("{origin}: front matter is not a map, ignoring it");
            Map::new()
        }
        Err(e) => {
            warn!("{origin}: malformed front matter, ignoring it: {e}");
            Map::new()
        }
    };
    (data, body)
}

/// Body after an empty `---`/`---` or `+++`/`+++` block, which the markdown
/// parser does not report as metadata.
fn empty_fence_body(text: &str) -> Option<&str> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    let second = lines.next()?;
    let fence = first.trim_end();
    if (fence == "---" || fence == "+++") && second.trim_end() == fence {
        let rest = &text[first.len() + second.len()..];
        Some(rest.trim_start_matches(['\r', '\n']))
    } else {
        None
    }
}

/// Convert TOML front matter to JSON; datetimes become their TOML text form.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

fn resolve_date(raw: Option<&Value>, path: &Path, origin: &str) -> ItemDate {
    match raw {
        None | Some(Value::Null) => file_date(path, false),
        Some(Value::String(s)) if s == "Last Modified" => file_date(path, false),
        Some(Value::String(s)) if s == "Created" => file_date(path, true),
        Some(Value::String(s)) => {
            let date = ItemDate::parse(s);
            if !date.is_valid() {
                warn!("{origin}: unparseable date '{s}', it will sort last");
            }
            date
        }
        Some(other) => {
            warn!("{origin}: date must be a string, got {other}");
            ItemDate::Invalid(other.to_string())
        }
    }
}

fn file_date(path: &Path, created: bool) -> ItemDate {
    let stamp = fs::metadata(path).and_then(|meta| {
        if created {
            meta.created().or_else(|_| meta.modified())
        } else {
            meta.modified()
        }
    });
    match stamp {
        Ok(time) => system_time_to_date(time),
        Err(e) => {
            warn!("{}: no file timestamp: {e}", path.display());
            ItemDate::Invalid(String::new())
        }
    }
}

fn system_time_to_date(time: SystemTime) -> ItemDate {
    ItemDate::Valid(DateTime::<Utc>::from(time).naive_utc())
}

fn parse_tags(raw: Option<&Value>) -> BTreeSet<String> {
    match raw {
        Some(Value::String(tag)) => BTreeSet::from([tag.clone()]),
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => BTreeSet::new(),
    }
}
