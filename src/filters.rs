//! Text helpers exposed to templates.
//!
//! Each helper is a plain function over explicit inputs. None of them can
//! fail: absent or malformed input degrades to an empty string, an empty
//! slice or the minimum count. [`crate::registry`] adapts them to the
//! JSON-valued filter interface templates call through.

use crate::types::ItemDate;
use chrono::Datelike;

/// Words per minute assumed by [`reading_time`].
pub const WORDS_PER_MINUTE: usize = 200;

/// Default cut length for [`excerpt`], in characters.
pub const DEFAULT_EXCERPT_LENGTH: usize = 150;

/// Output style for [`date_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateMode {
    /// `January 5, 2024`
    #[default]
    Full,
    /// `Jan 5, 2024`
    Short,
    /// `2024-01-05`
    Iso,
}

impl DateMode {
    /// Parse a mode name; anything unrecognized is [`DateMode::Full`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "short" => DateMode::Short,
            "iso" => DateMode::Iso,
            _ => DateMode::Full,
        }
    }
}

/// Format a date for display. Invalid dates format as `""`.
pub fn date_format(date: &ItemDate, mode: DateMode) -> String {
    let Some(dt) = date.value() else {
        return String::new();
    };
    let pattern = match mode {
        DateMode::Full => "%B %-d, %Y",
        DateMode::Short => "%b %-d, %Y",
        DateMode::Iso => "%Y-%m-%d",
    };
    dt.format(pattern).to_string()
}

/// Estimated reading time, e.g. `"3 min read"`. Never less than one minute.
pub fn reading_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}

/// Plain-text preview of `content`, cut at `length` characters.
///
/// Markup tags are removed and newlines become spaces before measuring. If
/// the text is longer than `length` it is hard-cut (mid-word if need be) and
/// `...` is appended.
pub fn excerpt(content: &str, length: usize) -> String {
    if content.is_empty() {
        return String::new();
    }
    let text = strip_tags(content).replace('\n', " ");
    let text = text.trim();
    if text.chars().count() > length {
        let cut: String = text.chars().take(length).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Remove `<...>` tags. A `<` with no closing `>`, or an empty `<>`, is kept
/// as text.
fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) if close > 0 => rest = &after[close + 1..],
            _ => {
                result.push('<');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// First `n` elements, or the last `|n|` elements when `n` is negative.
///
/// Out-of-range counts clamp to the whole slice.
pub fn head<T>(items: &[T], n: i64) -> &[T] {
    let count = usize::try_from(n.unsigned_abs())
        .unwrap_or(usize::MAX)
        .min(items.len());
    if n < 0 {
        &items[items.len() - count..]
    } else {
        &items[..count]
    }
}

/// The current calendar year, for copyright lines.
pub fn year() -> String {
    chrono::Local::now().year().to_string()
}
