//! Rendered-body cache for Quill.
//!
//! [`RenderCache`] maps a document's source path to its rendered HTML body.
//! Entries never expire; they are dropped only by [`RenderCache::invalidate`],
//! [`RenderCache::clear`] or process restart. Store reloads do not touch the
//! cache, so an editor saving one file invalidates exactly that file's entry.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use quill_cache::RenderCache;
//! use quill_content::DocumentParser;
//!
//! let parser = DocumentParser::new("content/blog");
//! let doc = parser.parse("content/blog/tech/intro.md".as_ref())?;
//!
//! let cache = RenderCache::new(parser);
//! let body = cache.get(&doc)?; // miss: parsed from disk
//! cache.invalidate(&doc.file_path);
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use quill_content::{Document, DocumentParser, ParseError};

/// Concurrent cache of rendered document bodies.
///
/// # Thread Safety
///
/// Backed by a sharded `DashMap`: operations on different keys do not
/// contend, and each key is updated atomically. Parsing on a miss happens
/// outside any shard lock.
pub struct RenderCache {
    parser: DocumentParser,
    entries: DashMap<PathBuf, String>,
}

impl RenderCache {
    /// Create an empty cache that re-parses misses with `parser`.
    #[must_use]
    pub fn new(parser: DocumentParser) -> Self {
        Self {
            parser,
            entries: DashMap::new(),
        }
    }

    /// Rendered body for `record`.
    ///
    /// A hit returns the stored body even if the file changed on disk since.
    /// A miss reads and parses `record.file_path` from disk (not the
    /// in-memory record), stores the result and returns it.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] if the file cannot be read or parsed on a
    /// miss. Nothing is cached in that case.
    pub fn get(&self, record: &Document) -> Result<String, ParseError> {
        if let Some(body) = self.entries.get(&record.file_path) {
            return Ok(body.value().clone());
        }

        tracing::debug!(path = %record.file_path.display(), "Render cache miss");
        let fresh = self.parser.parse(&record.file_path)?;
        self.entries
            .insert(record.file_path.clone(), fresh.body.clone());
        Ok(fresh.body)
    }

    /// Drop the entry for `path`. Does nothing if there is none.
    pub fn invalidate(&self, path: &Path) {
        if self.entries.remove(path).is_some() {
            tracing::info!(path = %path.display(), "Render cache entry invalidated");
        }
    }

    /// Number of cached bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
