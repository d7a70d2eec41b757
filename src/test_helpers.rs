//! Shared test utilities for the sitecollect test suite.
//!
//! Provides fixture setup, lookup helpers and bulk extractors that work with
//! the content store and collection views.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let store = scan(tmp.path(), &SiteConfig::default()).unwrap();
//!
//! let intro = find_item(&store, "CLQMS Overview");
//! assert_eq!(intro.url, "/clqms/intro/");
//! assert_eq!(view_titles(&posts_view(&store, &settings))[0], "Spring Update");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::content::ContentStore;
use crate::types::ContentItem;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// The copy is the project root: content lives under its `src/`.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Store lookups
// =========================================================================

/// Find an item by title. Panics if not found.
pub fn find_item<'a>(store: &'a ContentStore, title: &str) -> &'a ContentItem {
    store
        .items()
        .iter()
        .find(|i| i.title == title)
        .unwrap_or_else(|| {
            let titles: Vec<&str> = store.items().iter().map(|i| i.title.as_str()).collect();
            panic!("item '{title}' not found. Available: {titles:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Input paths of owned items, in order.
pub fn item_paths(items: &[ContentItem]) -> Vec<&str> {
    items.iter().map(|i| i.input_path.as_str()).collect()
}

/// Input paths of a view, in view order.
pub fn view_paths<'a>(view: &[&'a ContentItem]) -> Vec<&'a str> {
    view.iter().map(|i| i.input_path.as_str()).collect()
}

/// Titles of a view, in view order.
pub fn view_titles<'a>(view: &[&'a ContentItem]) -> Vec<&'a str> {
    view.iter().map(|i| i.title.as_str()).collect()
}
