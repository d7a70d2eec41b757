//! Site configuration module.
//!
//! Handles loading, validating, and merging `sitecollect.toml`. The file is
//! optional and sparse: stock defaults are the base layer and the user file
//! only overrides the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! template_formats = ["html", "njk", "md"]   # File extensions read as content
//! markdown_template_engine = "njk"            # Engine the renderer runs on .md
//! html_template_engine = "njk"                # Engine the renderer runs on .html
//!
//! [dir]
//! input = "src"             # Content root, relative to the project root
//! output = "_site"          # Where collections.json is written
//! includes = "_includes"    # Inside input; never scanned as content
//! layouts = "_layouts"      # Inside input; never scanned as content
//! data = "_data"            # Inside input; never scanned as content
//!
//! [collections]
//! posts_glob = "blog/**/*.md"   # Which input paths are posts
//! project_tag = "clqms"         # Tag selecting project items
//! default_order = 99            # Order for tagged items without a numeric `order`
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "sitecollect.toml";

/// Collection names always registered; the project tag may not reuse them.
pub const BUILTIN_COLLECTIONS: [&str; 2] = ["posts", "projects"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `sitecollect.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Input/output directory mapping.
    pub dir: DirConfig,
    /// File extensions treated as content templates.
    pub template_formats: Vec<String>,
    /// Template engine the renderer should run over markdown files.
    pub markdown_template_engine: String,
    /// Template engine the renderer should run over HTML files.
    pub html_template_engine: String,
    /// How the named collections select and order items.
    pub collections: CollectionSettings,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            dir: DirConfig::default(),
            template_formats: vec!["html".to_string(), "njk".to_string(), "md".to_string()],
            markdown_template_engine: "njk".to_string(),
            html_template_engine: "njk".to_string(),
            collections: CollectionSettings::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dir.input.trim().is_empty() {
            return Err(ConfigError::Validation("dir.input must not be empty".into()));
        }
        if self.dir.output.trim().is_empty() {
            return Err(ConfigError::Validation(
                "dir.output must not be empty".into(),
            ));
        }
        if self.dir.input == self.dir.output {
            return Err(ConfigError::Validation(
                "dir.input and dir.output must differ".into(),
            ));
        }
        if self.template_formats.is_empty() {
            return Err(ConfigError::Validation(
                "template_formats must not be empty".into(),
            ));
        }
        if let Err(e) = glob::Pattern::new(&self.collections.posts_glob) {
            return Err(ConfigError::Validation(format!(
                "collections.posts_glob is not a valid glob: {e}"
            )));
        }
        if self.collections.project_tag.trim().is_empty() {
            return Err(ConfigError::Validation(
                "collections.project_tag must not be empty".into(),
            ));
        }
        if BUILTIN_COLLECTIONS.contains(&self.collections.project_tag.as_str()) {
            return Err(ConfigError::Validation(format!(
                "collections.project_tag '{}' clashes with a built-in collection name",
                self.collections.project_tag
            )));
        }
        Ok(())
    }

    /// Whether a file extension (without the dot) is a configured template format.
    pub fn is_template_format(&self, ext: &str) -> bool {
        self.template_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(ext))
    }
}

/// Input/output directory mapping.
///
/// `input` and `output` are relative to the project root; `includes`,
/// `layouts` and `data` are relative to `input`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirConfig {
    pub input: String,
    pub output: String,
    pub includes: String,
    pub layouts: String,
    pub data: String,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            input: "src".to_string(),
            output: "_site".to_string(),
            includes: "_includes".to_string(),
            layouts: "_layouts".to_string(),
            data: "_data".to_string(),
        }
    }
}

impl DirConfig {
    /// Directories inside `input` that hold templates or data, not content.
    pub fn reserved(&self) -> [&str; 3] {
        [&self.includes, &self.layouts, &self.data]
    }
}

/// Collection selection and ordering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionSettings {
    /// Glob over input paths selecting the posts namespace.
    pub posts_glob: String,
    /// Tag selecting project items. Also the name of the ordered tag collection.
    pub project_tag: String,
    /// Order assigned to tagged items with no numeric `order`.
    pub default_order: f64,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            posts_glob: "blog/**/*.md".to_string(),
            project_tag: "clqms".to_string(),
            default_order: 99.0,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `sitecollect.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `sitecollect.toml` in the project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    let config = resolve_config(base, overlay)?;
    log::debug!(
        "config: input={} output={} posts={} tag={}",
        config.dir.input,
        config.dir.output,
        config.collections.posts_glob,
        config.collections.project_tag
    );
    Ok(config)
}

/// Returns a fully-commented stock `sitecollect.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sitecollect configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# File extensions read as content templates.
template_formats = ["html", "njk", "md"]

# Template engine the renderer runs over markdown and HTML files.
markdown_template_engine = "njk"
html_template_engine = "njk"

# ---------------------------------------------------------------------------
# Directories
# ---------------------------------------------------------------------------
[dir]
# Content root and output directory, relative to the project root.
input = "src"
output = "_site"

# Template and data directories inside the input directory.
# Files under these are never treated as content.
includes = "_includes"
layouts = "_layouts"
data = "_data"

# ---------------------------------------------------------------------------
# Collections
# ---------------------------------------------------------------------------
[collections]
# Input paths matching this glob form the `posts` collection.
posts_glob = "blog/**/*.md"

# Items with this tag are merged into `projects` and listed, ordered by
# their `order` front matter value, in a collection named after the tag.
project_tag = "clqms"

# Order used for tagged items whose `order` is missing or not a number.
default_order = 99
"##
}
