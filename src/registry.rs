//! Registration shim between the pure helpers and the template engine.
//!
//! Templates call filters by name with JSON values (`{{ post.date | dateFormat("short") }}`),
//! so the renderer needs name-keyed tables of functions over
//! [`serde_json::Value`]. [`configure`] fills a [`Registry`] with the site's
//! filters, shortcodes and collections; the functions it wires in live in
//! [`crate::filters`] and [`crate::collections`] and are usable without it.
//!
//! Arguments of the wrong JSON type degrade the way the pure functions do:
//! a non-string date formats as `""`, a non-array `head` input yields `[]`.

use crate::collections::{self, CollectionView, Collections};
use crate::config::CollectionSettings;
use crate::content::ContentStore;
use crate::filters::{self, DateMode};
use crate::types::{ContentItem, ItemDate};
use log::info;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// A template filter: piped input plus positional arguments.
pub type FilterFn = fn(&Value, &[Value]) -> Value;

/// A template shortcode: positional arguments, rendered inline.
pub type ShortcodeFn = fn(&[Value]) -> String;

/// A collection builder over the content store.
pub type CollectionFn =
    for<'a> fn(&'a ContentStore, &CollectionSettings) -> Vec<&'a ContentItem>;

#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
    #[error("Unknown shortcode: {0}")]
    UnknownShortcode(String),
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

/// Name-keyed filters, shortcodes and collections.
///
/// Re-registering a name replaces the earlier entry. Collections remember
/// their registration order, which is the order [`Registry::build_collections`]
/// returns them in.
#[derive(Default)]
pub struct Registry {
    filters: BTreeMap<String, FilterFn>,
    shortcodes: BTreeMap<String, ShortcodeFn>,
    collections: Vec<(String, CollectionFn)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(&mut self, name: &str, filter: FilterFn) {
        self.filters.insert(name.to_string(), filter);
    }

    pub fn add_shortcode(&mut self, name: &str, shortcode: ShortcodeFn) {
        self.shortcodes.insert(name.to_string(), shortcode);
    }

    pub fn add_collection(&mut self, name: &str, collection: CollectionFn) {
        match self.collections.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = collection,
            None => self.collections.push((name.to_string(), collection)),
        }
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn shortcode_names(&self) -> impl Iterator<Item = &str> {
        self.shortcodes.keys().map(String::as_str)
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|(n, _)| n.as_str())
    }

    /// Apply a named filter to `input`.
    pub fn apply_filter(
        &self,
        name: &str,
        input: &Value,
        args: &[Value],
    ) -> Result<Value, RegistryError> {
        let filter = self
            .filters
            .get(name)
            .ok_or_else(|| RegistryError::UnknownFilter(name.to_string()))?;
        Ok(filter(input, args))
    }

    /// Render a named shortcode.
    pub fn render_shortcode(&self, name: &str, args: &[Value]) -> Result<String, RegistryError> {
        let shortcode = self
            .shortcodes
            .get(name)
            .ok_or_else(|| RegistryError::UnknownShortcode(name.to_string()))?;
        Ok(shortcode(args))
    }

    /// Build one named collection.
    pub fn collection<'a>(
        &self,
        name: &str,
        store: &'a ContentStore,
        settings: &CollectionSettings,
    ) -> Result<CollectionView<'a>, RegistryError> {
        let (name, build) = self
            .collections
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| RegistryError::UnknownCollection(name.to_string()))?;
        Ok(CollectionView {
            name: name.clone(),
            items: build(store, settings),
        })
    }

    /// Build every registered collection, in registration order.
    pub fn build_collections<'a>(
        &self,
        store: &'a ContentStore,
        settings: &CollectionSettings,
    ) -> Collections<'a> {
        let views = self
            .collections
            .iter()
            .map(|(name, build)| {
                let items = build(store, settings);
                info!("collection {name}: {} items", items.len());
                CollectionView {
                    name: name.clone(),
                    items,
                }
            })
            .collect();
        Collections { views }
    }
}

/// Register the site's filters, shortcodes and collections.
///
/// The tag-ordered collection is registered under the project tag itself,
/// so templates iterate `collections.clqms` with the stock settings.
pub fn configure(registry: &mut Registry, settings: &CollectionSettings) {
    registry.add_shortcode("year", year_shortcode);

    registry.add_filter("dateFormat", date_format_filter);
    registry.add_filter("readingTime", reading_time_filter);
    registry.add_filter("excerpt", excerpt_filter);
    registry.add_filter("head", head_filter);

    registry.add_collection("posts", collections::posts_view);
    registry.add_collection("projects", collections::projects_view);
    registry.add_collection(&settings.project_tag, collections::tagged_ordered_view);
}

// ============================================================================
// Adapters
// ============================================================================

fn year_shortcode(_args: &[Value]) -> String {
    filters::year()
}

/// `date | dateFormat(mode?)`
fn date_format_filter(input: &Value, args: &[Value]) -> Value {
    let date = match input {
        Value::String(s) => ItemDate::parse(s),
        other => ItemDate::Invalid(other.to_string()),
    };
    let mode = args
        .first()
        .and_then(Value::as_str)
        .map(DateMode::from_name)
        .unwrap_or_default();
    Value::String(filters::date_format(&date, mode))
}

/// `content | readingTime`
fn reading_time_filter(input: &Value, _args: &[Value]) -> Value {
    Value::String(filters::reading_time(input.as_str().unwrap_or_default()))
}

/// `content | excerpt(length?)`
fn excerpt_filter(input: &Value, args: &[Value]) -> Value {
    let length = match count_arg(args) {
        Some(n) => usize::try_from(n.max(0)).unwrap_or(usize::MAX),
        None => filters::DEFAULT_EXCERPT_LENGTH,
    };
    Value::String(filters::excerpt(input.as_str().unwrap_or_default(), length))
}

/// `array | head(n)`; a missing `n` returns the whole array.
fn head_filter(input: &Value, args: &[Value]) -> Value {
    let Some(items) = input.as_array() else {
        return Value::Array(Vec::new());
    };
    match count_arg(args) {
        Some(n) => Value::Array(filters::head(items, n).to_vec()),
        None => Value::Array(items.clone()),
    }
}

/// First argument as a whole count. Floats are truncated toward zero and
/// saturate at the `i64` range; non-numbers and non-finite values are absent.
fn count_arg(args: &[Value]) -> Option<i64> {
    let arg = args.first()?;
    arg.as_i64().or_else(|| {
        arg.as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configured() -> Registry {
        let mut registry = Registry::new();
        configure(&mut registry, &CollectionSettings::default());
        registry
    }

    #[test]
    fn configure_registers_everything() {
        let registry = configured();
        assert_eq!(
            registry.filter_names().collect::<Vec<_>>(),
            vec!["dateFormat", "excerpt", "head", "readingTime"]
        );
        assert_eq!(registry.shortcode_names().collect::<Vec<_>>(), vec!["year"]);
        assert_eq!(
            registry.collection_names().collect::<Vec<_>>(),
            vec!["posts", "projects", "clqms"]
        );
    }

    #[test]
    fn tagged_collection_named_after_tag() {
        let mut registry = Registry::new();
        let settings = CollectionSettings {
            project_tag: "work".to_string(),
            ..CollectionSettings::default()
        };
        configure(&mut registry, &settings);
        assert!(registry.collection_names().any(|n| n == "work"));
        assert!(!registry.collection_names().any(|n| n == "clqms"));
    }

    #[test]
    fn unknown_names_are_errors() {
        let registry = configured();
        assert_eq!(
            registry.apply_filter("nope", &json!(""), &[]),
            Err(RegistryError::UnknownFilter("nope".to_string()))
        );
        assert_eq!(
            registry.render_shortcode("nope", &[]),
            Err(RegistryError::UnknownShortcode("nope".to_string()))
        );
        let store = ContentStore::default();
        assert!(matches!(
            registry.collection("nope", &store, &CollectionSettings::default()),
            Err(RegistryError::UnknownCollection(_))
        ));
    }

    #[test]
    fn re_registering_collection_keeps_position() {
        let mut registry = configured();
        registry.add_collection("posts", collections::projects_view);
        assert_eq!(
            registry.collection_names().collect::<Vec<_>>(),
            vec!["posts", "projects", "clqms"]
        );
    }

    // =========================================================================
    // Filter adapters
    // =========================================================================

    #[test]
    fn date_format_filter_modes() {
        let registry = configured();
        let date = json!("2024-01-05");
        assert_eq!(
            registry.apply_filter("dateFormat", &date, &[]).unwrap(),
            json!("January 5, 2024")
        );
        assert_eq!(
            registry.apply_filter("dateFormat", &date, &[json!("short")]).unwrap(),
            json!("Jan 5, 2024")
        );
        assert_eq!(
            registry.apply_filter("dateFormat", &date, &[json!("iso")]).unwrap(),
            json!("2024-01-05")
        );
        assert_eq!(
            registry.apply_filter("dateFormat", &date, &[json!(42)]).unwrap(),
            json!("January 5, 2024")
        );
    }

    #[test]
    fn date_format_filter_bad_input() {
        let registry = configured();
        assert_eq!(
            registry.apply_filter("dateFormat", &json!(null), &[]).unwrap(),
            json!("")
        );
        assert_eq!(
            registry.apply_filter("dateFormat", &json!("garbage"), &[]).unwrap(),
            json!("")
        );
    }

    #[test]
    fn reading_time_filter_non_string_is_one_minute() {
        let registry = configured();
        assert_eq!(
            registry.apply_filter("readingTime", &json!(null), &[]).unwrap(),
            json!("1 min read")
        );
        let words = "word ".repeat(201);
        assert_eq!(
            registry.apply_filter("readingTime", &json!(words), &[]).unwrap(),
            json!("2 min read")
        );
    }

    #[test]
    fn excerpt_filter_default_and_explicit_length() {
        let registry = configured();
        let long = "x".repeat(200);
        let out = registry.apply_filter("excerpt", &json!(long), &[]).unwrap();
        assert_eq!(out.as_str().unwrap().chars().count(), 153);

        assert_eq!(
            registry
                .apply_filter("excerpt", &json!("<p>Hello world</p>"), &[json!(5)])
                .unwrap(),
            json!("Hello...")
        );
        assert_eq!(
            registry.apply_filter("excerpt", &json!(null), &[json!(5)]).unwrap(),
            json!("")
        );
    }

    #[test]
    fn head_filter_slices() {
        let registry = configured();
        let arr = json!([1, 2, 3, 4, 5]);
        assert_eq!(
            registry.apply_filter("head", &arr, &[json!(2)]).unwrap(),
            json!([1, 2])
        );
        assert_eq!(
            registry.apply_filter("head", &arr, &[json!(-2)]).unwrap(),
            json!([4, 5])
        );
        assert_eq!(registry.apply_filter("head", &arr, &[]).unwrap(), arr);
    }

    #[test]
    fn count_arguments_accept_whole_floats() {
        let registry = configured();
        let arr = json!([1, 2, 3, 4, 5]);
        assert_eq!(
            registry.apply_filter("head", &arr, &[json!(2.0)]).unwrap(),
            json!([1, 2])
        );
        assert_eq!(
            registry.apply_filter("head", &arr, &[json!(-2.7)]).unwrap(),
            json!([4, 5])
        );
        assert_eq!(
            registry
                .apply_filter("excerpt", &json!("<p>Hello world</p>"), &[json!(5.0)])
                .unwrap(),
            json!("Hello...")
        );
        assert_eq!(
            registry.apply_filter("head", &arr, &[json!(1e300)]).unwrap(),
            arr
        );
    }

    #[test]
    fn excerpt_negative_length_cuts_everything() {
        let registry = configured();
        assert_eq!(
            registry
                .apply_filter("excerpt", &json!("Hello"), &[json!(-3)])
                .unwrap(),
            json!("...")
        );
    }

    #[test]
    fn non_numeric_count_is_ignored() {
        let registry = configured();
        let arr = json!([1, 2, 3]);
        assert_eq!(
            registry.apply_filter("head", &arr, &[json!("2")]).unwrap(),
            arr
        );
        let long = "x".repeat(200);
        let out = registry
            .apply_filter("excerpt", &json!(long), &[json!(null)])
            .unwrap();
        assert_eq!(out.as_str().unwrap().chars().count(), 153);
    }

    #[test]
    fn head_filter_non_array_is_empty() {
        let registry = configured();
        assert_eq!(
            registry.apply_filter("head", &json!("abc"), &[json!(2)]).unwrap(),
            json!([])
        );
        assert_eq!(
            registry.apply_filter("head", &json!(null), &[json!(2)]).unwrap(),
            json!([])
        );
    }

    #[test]
    fn year_shortcode_renders() {
        let registry = configured();
        assert_eq!(
            registry.render_shortcode("year", &[]).unwrap(),
            filters::year()
        );
    }

    // =========================================================================
    // Collections through the registry
    // =========================================================================

    #[test]
    fn build_collections_in_registration_order() {
        let store = ContentStore::new(vec![
            ContentItem::new("blog/a.md", ItemDate::parse("2024-01-01")),
            ContentItem::new("clqms/p.md", ItemDate::parse("2024-02-01")).with_tags(["clqms"]),
        ]);
        let registry = configured();
        let built = registry.build_collections(&store, &CollectionSettings::default());
        let names: Vec<&str> = built.views.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["posts", "projects", "clqms"]);
        assert_eq!(built.get("posts").unwrap().len(), 1);
        assert_eq!(built.get("projects").unwrap().len(), 2);
        assert_eq!(built.get("clqms").unwrap().len(), 1);
    }

    #[test]
    fn single_collection_lookup() {
        let store = ContentStore::new(vec![ContentItem::new(
            "blog/a.md",
            ItemDate::parse("2024-01-01"),
        )]);
        let registry = configured();
        let view = registry
            .collection("posts", &store, &CollectionSettings::default())
            .unwrap();
        assert_eq!(view.name, "posts");
        assert_eq!(view.items[0].input_path, "blog/a.md");
    }
}
