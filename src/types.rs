//! Shared types passed between discovery, the collection builder, the filters
//! and the `collections.json` output.
//!
//! A [`ContentItem`] is read-only once discovered: collections only reorder
//! and filter references to items, they never modify them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Publication date of an item.
///
/// Dates come from hand-written front matter, so they can be garbage. An
/// unparseable date is kept as [`ItemDate::Invalid`] with its raw text rather
/// than rejected: it still sorts (after every valid date) and still formats
/// (as an empty string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemDate {
    Valid(NaiveDateTime),
    Invalid(String),
}

/// Accepted date-time layouts, tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl ItemDate {
    /// Parse a front matter date.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` (with a space or `T`) and
    /// RFC 3339 timestamps, which are normalized to UTC. Anything else is
    /// returned as `Invalid`.
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return ItemDate::Valid(dt.naive_utc());
        }
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return ItemDate::Valid(dt);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return ItemDate::Valid(date.and_time(NaiveTime::default()));
        }
        ItemDate::Invalid(raw.to_string())
    }

    /// The parsed value, or `None` for an invalid date.
    pub fn value(&self) -> Option<NaiveDateTime> {
        match self {
            ItemDate::Valid(dt) => Some(*dt),
            ItemDate::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ItemDate::Valid(_))
    }
}

impl From<NaiveDateTime> for ItemDate {
    fn from(dt: NaiveDateTime) -> Self {
        ItemDate::Valid(dt)
    }
}

impl fmt::Display for ItemDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemDate::Valid(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            ItemDate::Invalid(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for ItemDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ItemDate::parse(&raw))
    }
}

/// A single piece of site content: one template file plus its front matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Path relative to the input directory, always `/`-separated.
    pub input_path: String,
    /// Output URL (`permalink` from front matter, or derived from the path).
    pub url: String,
    /// Front matter `title`, or the file stem.
    pub title: String,
    pub date: ItemDate,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// The full front matter, as a JSON object.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Template body with the front matter removed.
    #[serde(default)]
    pub content: String,
}

impl ContentItem {
    /// Minimal item for callers that build a store by hand.
    pub fn new(input_path: impl Into<String>, date: ItemDate) -> Self {
        let input_path = input_path.into();
        let title = input_path
            .rsplit('/')
            .next()
            .and_then(|name| name.split('.').next())
            .unwrap_or_default()
            .to_string();
        Self {
            url: format!("/{}/", title),
            input_path,
            title,
            date,
            tags: BTreeSet::new(),
            data: Map::new(),
            content: String::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Numeric `data.order`, if present.
    ///
    /// Numbers and numeric strings count (`3` and `"3"` are both 3). Anything
    /// else, including non-finite values, is treated as absent.
    pub fn order(&self) -> Option<f64> {
        let order = match self.data.get("order")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        order.filter(|n| n.is_finite())
    }
}
