//! CLI output formatting for the scan and collection stages.
//!
//! # Information-First Display
//!
//! Every item is shown by its title and position, with the source file as an
//! indented `Source:` line. The output reads as a content inventory while still
//! pointing back at the files it came from.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Items
//! 001 CLQMS Overview (2023-11-20)
//!     Source: clqms/intro.md
//!     Tags: clqms
//! 002 Undated Thoughts (invalid date: sometime soon)
//!     Source: blog/drafts/undated-thoughts.md
//!     Tags: post
//!
//! Scanned 2 items
//! ```
//!
//! ## Collections
//!
//! ```text
//! posts (2 items)
//!     001 Spring Update → /blog/2024-03-spring-update/
//!     002 First Post → /blog/2024-01-first-post/
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout.

use crate::collections::Collections;
use crate::content::ContentStore;
use crate::filters::{DateMode, date_format};
use crate::types::{ContentItem, ItemDate};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn date_label(date: &ItemDate) -> String {
    match date {
        ItemDate::Valid(_) => date_format(date, DateMode::Iso),
        ItemDate::Invalid(raw) => format!("invalid date: {}", raw),
    }
}

/// `001 Title (2024-01-05)`
fn item_header(index: usize, item: &ContentItem) -> String {
    format!(
        "{} {} ({})",
        format_index(index),
        item.title,
        date_label(&item.date)
    )
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "item" } else { "items" }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the scanned content store in encounter order.
pub fn format_scan_output(store: &ContentStore) -> Vec<String> {
    let mut lines = vec!["Items".to_string()];

    for (i, item) in store.items().iter().enumerate() {
        lines.push(item_header(i + 1, item));
        lines.push(format!("{}Source: {}", indent(1), item.input_path));
        if !item.tags.is_empty() {
            let tags: Vec<&str> = item.tags.iter().map(String::as_str).collect();
            lines.push(format!("{}Tags: {}", indent(1), tags.join(", ")));
        }
    }

    lines.push(String::new());
    lines.push(format!("Scanned {} {}", store.len(), plural(store.len())));
    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(store: &ContentStore) {
    for line in format_scan_output(store) {
        println!("{}", line);
    }
}

// ============================================================================
// Collections output
// ============================================================================

/// Format every collection with its members in collection order.
pub fn format_collections_output(collections: &Collections) -> Vec<String> {
    let mut lines = Vec::new();

    for (n, view) in collections.views.iter().enumerate() {
        if n > 0 {
            lines.push(String::new());
        }
        lines.push(format!("{} ({} {})", view.name, view.len(), plural(view.len())));
        for (i, item) in view.items.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(i + 1),
                item.title,
                item.url
            ));
        }
    }

    lines
}

/// Print collections output to stdout.
pub fn print_collections_output(collections: &Collections) {
    for line in format_collections_output(collections) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
