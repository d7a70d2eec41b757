//! # sitecollect
//!
//! The content side of a small static site: discover content items, derive
//! named and ordered collections from them, and expose the text helpers that
//! templates call as filters and shortcodes. Rendering belongs to whatever
//! template engine consumes the result.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan         src/          →  ContentStore       (files + front matter)
//! 2. Collections  ContentStore  →  posts / projects / clqms views
//! 3. Build        views         →  _site/collections.json
//! ```
//!
//! The store is an immutable snapshot. Views borrow from it and are recomputed
//! on every build, so nothing is cached between runs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Walks the input directory, splits front matter, produces the [`content::ContentStore`] |
//! | [`collections`] | The three views: newest-first posts, merged projects, tag ordered by `order` |
//! | [`filters`] | `dateFormat`, `readingTime`, `excerpt`, `head` and the `year` shortcode |
//! | [`registry`] | Name-keyed tables wiring filters, shortcodes and collections for a template engine |
//! | [`config`] | `sitecollect.toml` loading, merging over stock defaults, validation |
//! | [`types`] | `ContentItem` and `ItemDate`, shared by every stage |
//! | [`output`] | CLI output formatting for scan and collection listings |
//!
//! # Design Decisions
//!
//! ## Invalid Dates Sort Last
//!
//! A date that does not parse is kept as [`types::ItemDate::Invalid`] rather
//! than rejected. Every date comparison treats it as later than any real date
//! in ascending order and older than any real date in newest-first order, so
//! sorting stays a total order and undated drafts collect at the end of every
//! view.
//!
//! ## Stable Sorts Over Encounter Order
//!
//! The store is ordered oldest first, ties broken by input path. Every view
//! sorts with a stable sort, so items with equal keys keep that order and
//! builds are reproducible.
//!
//! ## Pure Helpers, Thin Registry
//!
//! Each filter and collection is a plain function. [`registry::configure`]
//! only maps names to them, so the logic is testable without a template engine.

pub mod collections;
pub mod config;
pub mod content;
pub mod filters;
pub mod output;
pub mod registry;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
