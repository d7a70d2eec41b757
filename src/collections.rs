//! The collection builder.
//!
//! Derives the named, ordered views templates iterate over:
//!
//! | Collection | Source | Order |
//! |------------|--------|-------|
//! | `posts` | items matching `posts_glob` | newest first |
//! | `projects` | posts, then items tagged `project_tag` | newest first |
//! | `<project_tag>` | items tagged `project_tag` | `order` ascending |
//!
//! Every view is a fresh `Vec` of references into the [`ContentStore`],
//! recomputed per build. All sorts are stable, so items that compare equal
//! stay in store order.
//!
//! `projects` is a plain concatenation: a post that also carries the project
//! tag appears twice.
//!
//! Invalid dates never panic a sort. They compare equal to each other and
//! greater than any valid date, which puts them at the end of the
//! newest-first views.

use crate::config::CollectionSettings;
use crate::content::ContentStore;
use crate::types::{ContentItem, ItemDate};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::cmp::Ordering;

/// A named, ordered view over the store.
#[derive(Debug, Serialize)]
pub struct CollectionView<'a> {
    pub name: String,
    pub items: Vec<&'a ContentItem>,
}

impl CollectionView<'_> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// All views of a build, in registration order.
///
/// Serializes as a JSON object `{ name: [item, ...] }`, the shape the
/// renderer reads from `collections.json`.
#[derive(Debug, Default)]
pub struct Collections<'a> {
    pub views: Vec<CollectionView<'a>>,
}

impl<'a> Collections<'a> {
    pub fn get(&self, name: &str) -> Option<&CollectionView<'a>> {
        self.views.iter().find(|v| v.name == name)
    }
}

impl Serialize for Collections<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.views.len()))?;
        for view in &self.views {
            map.serialize_entry(&view.name, &view.items)?;
        }
        map.end()
    }
}

/// Newest first; invalid dates after all valid ones.
pub fn newest_first(a: &ItemDate, b: &ItemDate) -> Ordering {
    match (a.value(), b.value()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order used for sorting the tagged view: `data.order` or the default.
pub fn effective_order(item: &ContentItem, settings: &CollectionSettings) -> f64 {
    item.order().unwrap_or(settings.default_order)
}

/// The `posts` collection: posts-namespace items, newest first.
pub fn posts_view<'a>(
    store: &'a ContentStore,
    settings: &CollectionSettings,
) -> Vec<&'a ContentItem> {
    let mut posts = store.filtered_by_glob(&settings.posts_glob);
    posts.sort_by(|a, b| newest_first(&a.date, &b.date));
    posts
}

/// The `projects` collection: posts followed by tagged items, newest first.
///
/// No deduplication: the output length is always `posts + tagged`.
pub fn projects_view<'a>(
    store: &'a ContentStore,
    settings: &CollectionSettings,
) -> Vec<&'a ContentItem> {
    let mut projects = store.filtered_by_glob(&settings.posts_glob);
    projects.extend(store.filtered_by_tag(&settings.project_tag));
    projects.sort_by(|a, b| newest_first(&a.date, &b.date));
    projects
}

/// The tagged collection: items tagged `project_tag`, by ascending `order`.
pub fn tagged_ordered_view<'a>(
    store: &'a ContentStore,
    settings: &CollectionSettings,
) -> Vec<&'a ContentItem> {
    let mut tagged = store.filtered_by_tag(&settings.project_tag);
    tagged.sort_by(|a, b| {
        effective_order(a, settings).total_cmp(&effective_order(b, settings))
    });
    tagged
}
