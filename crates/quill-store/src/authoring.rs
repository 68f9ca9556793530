//! Document creation, editing and removal.
//!
//! These operations only touch the filesystem. Callers reload the store (and
//! rebuild the search index) afterwards; saving also requires invalidating
//! the render cache entry for the edited path.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::store::{ContentStore, StoreError};

static INVALID_SLUG_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9-]+").unwrap());
static REPEATED_DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Request to create a new document.
#[derive(Clone, Debug, Default)]
pub struct NewDocument {
    /// Category directory (empty for uncategorized).
    pub category: String,
    /// Document title.
    pub title: String,
    /// Slug; derived from the title when blank.
    pub slug: String,
    /// Create as a draft.
    pub draft: bool,
}

/// Normalize a slug to `[a-z0-9-]`.
///
/// A blank `slug` is derived from `title`. If nothing usable remains (for
/// example a title written entirely in CJK), a timestamp slug is returned.
///
/// # Examples
///
/// ```
/// use quill_store::normalize_slug;
///
/// assert_eq!(normalize_slug("Hello, World!", ""), "hello-world");
/// assert_eq!(normalize_slug("ignored", "My--Custom Slug"), "my-custom-slug");
/// ```
#[must_use]
pub fn normalize_slug(title: &str, slug: &str) -> String {
    let source = if slug.trim().is_empty() { title } else { slug };
    let lowered = source.trim().to_lowercase().replace(' ', "-");
    let cleaned = INVALID_SLUG_CHARS.replace_all(&lowered, "");
    let collapsed = REPEATED_DASHES.replace_all(&cleaned, "-");
    let trimmed = collapsed.trim_matches('-');

    if trimmed.is_empty() {
        chrono::Local::now().format("%Y%m%d-%H%M%S").to_string()
    } else {
        trimmed.to_owned()
    }
}

/// Quote a string as a double-quoted YAML scalar.
fn yaml_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl ContentStore {
    /// Write a new document skeleton and return its path.
    ///
    /// The file lands at `<content_dir>/<category>/<slug>.md` with a
    /// front-matter block holding the title, today's date and an empty tag
    /// list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the file exists,
    /// `StoreError::PathOutsideRoot` if the category is not a single
    /// directory name, and `StoreError::Io` on write failure.
    pub fn create_document(&self, request: &NewDocument) -> Result<PathBuf, StoreError> {
        let category = request.category.trim();
        let mut dir = self.content_dir().to_path_buf();
        if !category.is_empty() {
            let mut components = Path::new(category).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(name)), None) => dir.push(name),
                _ => return Err(StoreError::PathOutsideRoot(PathBuf::from(category))),
            }
        }

        let slug = normalize_slug(&request.title, &request.slug);
        let path = dir.join(format!("{slug}.md"));

        fs::create_dir_all(&dir).map_err(io_error(&dir))?;

        let mut front = format!(
            "---\ntitle: {}\ndate: {}\n",
            yaml_quote(&request.title),
            chrono::Local::now().format("%Y-%m-%d")
        );
        if request.draft {
            front.push_str("draft: true\n");
        }
        front.push_str("tags: []\n---\n\nStart writing here...\n");

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(path));
            }
            Err(e) => return Err(io_error(&path)(e)),
        };
        file.write_all(front.as_bytes()).map_err(io_error(&path))?;

        tracing::info!(path = %path.display(), draft = request.draft, "Created document");
        Ok(path)
    }

    /// Overwrite a document's source.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PathOutsideRoot` if `path` is not inside the
    /// content directory and `StoreError::Io` on write failure.
    pub fn save_document(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        let resolved = self.resolve_inside_root(path)?;
        fs::write(&resolved, content).map_err(io_error(&resolved))?;
        tracing::info!(path = %resolved.display(), "Saved document");
        Ok(())
    }

    /// Delete a document's source file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PathOutsideRoot` if `path` is not inside the
    /// content directory and `StoreError::Io` if removal fails.
    pub fn delete_document(&self, path: &Path) -> Result<(), StoreError> {
        let resolved = self.resolve_inside_root(path)?;
        fs::remove_file(&resolved).map_err(io_error(&resolved))?;
        tracing::info!(path = %resolved.display(), "Deleted document");
        Ok(())
    }

    /// Canonicalize `path` and require it to sit under the content root.
    ///
    /// The file itself may not exist yet, but its directory must.
    fn resolve_inside_root(&self, path: &Path) -> Result<PathBuf, StoreError> {
        let outside = || StoreError::PathOutsideRoot(path.to_path_buf());

        let root = self.content_dir();
        let root = fs::canonicalize(root).map_err(io_error(root))?;
        let file_name = path.file_name().ok_or_else(outside)?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let parent = fs::canonicalize(parent).map_err(|_| outside())?;

        if !parent.starts_with(&root) {
            return Err(outside());
        }
        Ok(parent.join(file_name))
    }
}
