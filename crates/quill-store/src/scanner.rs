//! Content file discovery by filesystem walking.
//!
//! Discovery is separate from parsing: the scanner only returns paths, in a
//! deterministic order, so that the store can parse them in parallel and
//! still resolve duplicate keys the same way on every reload.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File extensions treated as content documents.
const CONTENT_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Recursively collect content files under `root`.
///
/// Hidden entries (leading `.`) are skipped. Entries within each directory
/// are visited in file-name order. Unreadable subdirectories are logged and
/// skipped.
///
/// # Errors
///
/// Returns the I/O error if `root` itself cannot be read.
pub(crate) fn scan_documents(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let entries = sorted_entries(root)?;
    collect(entries, &mut paths);
    Ok(paths)
}

/// Collect content files directly inside `dir` (no recursion).
///
/// A missing directory yields an empty list.
pub(crate) fn scan_flat(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = sorted_entries(dir) else {
        return Vec::new();
    };
    entries
        .into_iter()
        .filter(|(path, is_dir)| !is_dir && is_content_file(path))
        .map(|(path, _)| path)
        .collect()
}

fn collect(entries: Vec<(PathBuf, bool)>, paths: &mut Vec<PathBuf>) {
    for (path, is_dir) in entries {
        if is_dir {
            match sorted_entries(&path) {
                Ok(children) => collect(children, paths),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable directory"
                    );
                }
            }
        } else if is_content_file(&path) {
            paths.push(path);
        }
    }
}

/// Read a directory into `(path, is_dir)` pairs sorted by name, minus hidden entries.
fn sorted_entries(dir: &Path) -> io::Result<Vec<(PathBuf, bool)>> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| {
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            (e.path(), is_dir)
        })
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
