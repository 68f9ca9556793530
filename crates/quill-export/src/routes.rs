//! Output paths and URLs of generated pages.
//!
//! A route is a path relative to the output root, spelled the way it appears
//! in a URL. Directory routes end in `/` (the home route is empty) and are
//! written as `index.html` inside that directory. The page writers, the feed,
//! the sitemap and template links all derive their locations from here, so a
//! link exists exactly when its file is written.

use std::path::{Path, PathBuf};

use quill_content::{Document, Page};

/// Top-level directories owned by generated sections.
const SECTION_DIRS: &[&str] = &["categories", "category", "page", "static", "tag", "tags"];

/// Turn a name into a single path segment.
///
/// Separators become `-`. Returns `None` for names that would escape the
/// output directory.
pub(crate) fn path_segment(name: &str) -> Option<String> {
    let segment = name.replace(['/', '\\'], "-");
    let trimmed = segment.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        None
    } else {
        Some(segment)
    }
}

/// Home index page `n` (1-based).
pub(crate) fn index_route(n: usize) -> String {
    if n <= 1 {
        String::new()
    } else {
        format!("page/{n}/")
    }
}

/// Post page, or `None` if the category or slug is unusable as a path.
pub(crate) fn post_route(doc: &Document) -> Option<String> {
    let category = path_segment(&doc.category)?;
    let slug = path_segment(&doc.slug)?;
    Some(format!("{category}/{slug}.html"))
}

pub(crate) fn category_route(name: &str) -> Option<String> {
    path_segment(name).map(|segment| format!("category/{segment}/"))
}

pub(crate) fn tag_route(name: &str) -> Option<String> {
    path_segment(name).map(|segment| format!("tag/{segment}/"))
}

pub(crate) fn page_route(page: &Page) -> Option<String> {
    path_segment(&page.slug).map(|segment| format!("page/{segment}.html"))
}

/// File written for `route` under `output_dir`.
pub(crate) fn route_file(output_dir: &Path, route: &str) -> PathBuf {
    if route.is_empty() || route.ends_with('/') {
        output_dir.join(route).join("index.html")
    } else {
        output_dir.join(route)
    }
}

/// Absolute URL of `route`.
pub(crate) fn route_url(base_url: &str, route: &str) -> String {
    format!("{base_url}/{route}")
}

/// Whether posts in `category` share a directory with a generated section.
pub(crate) fn shadows_section(category: &str) -> bool {
    path_segment(category).is_some_and(|segment| SECTION_DIRS.contains(&segment.as_str()))
}
