//! Reloadable content store.
//!
//! Provides [`ContentStore`], the single owner of the current [`Snapshot`].
//!
//! # Architecture
//!
//! A reload walks the content root, parses every document in parallel,
//! and builds a fresh snapshot in local variables. The new snapshot replaces
//! the old one with a single pointer swap. Documents that fail to parse are
//! logged and left out; they never fail the reload.
//!
//! # Thread Safety
//!
//! `ContentStore` is designed for concurrent access:
//! - `snapshot()` returns `Arc<Snapshot>` with minimal locking (just Arc clone)
//! - `reload()` is serialized by a mutex and holds the write lock only for the swap
//! - Readers holding an older `Arc<Snapshot>` keep a consistent view

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use quill_content::{Document, DocumentParser, Page};
use rayon::prelude::*;

use crate::scanner;
use crate::snapshot::{Adjacent, CategoryCount, Pagination, Snapshot, TagCount};

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Error returned by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record matches the request.
    #[error("Document not found: {0}")]
    NotFound(String),
    /// Filesystem failure on the content tree.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A document already exists at the target path.
    #[error("Document already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    /// The path resolves outside the content root.
    #[error("Path is outside the content directory: {}", .0.display())]
    PathOutsideRoot(PathBuf),
}

/// Locations the store reads from.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Root of blog documents.
    pub content_dir: PathBuf,
    /// Directory of standalone pages (flat).
    pub pages_dir: PathBuf,
}

/// Counters reported by [`ContentStore::reload`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReloadStats {
    /// Records in the new snapshot, drafts included.
    pub documents: usize,
    /// Published records.
    pub published: usize,
    /// Standalone pages.
    pub pages: usize,
    /// Files skipped because they failed to parse or repeated a key.
    pub skipped: usize,
    /// Wall time of the reload.
    pub elapsed_ms: f64,
}

/// Authoritative in-memory collection of parsed documents.
///
/// # Thread Safety
///
/// - Uses internal `RwLock<Arc<Snapshot>>` for the current snapshot
/// - Uses `Mutex<()>` for serializing reload operations
pub struct ContentStore {
    parser: DocumentParser,
    pages_dir: PathBuf,
    /// Mutex for serializing reload operations.
    reload_lock: Mutex<()>,
    /// Current snapshot (atomically swappable).
    current: RwLock<Arc<Snapshot>>,
}

impl ContentStore {
    /// Create a store with an empty snapshot.
    ///
    /// Call [`ContentStore::reload`] to populate it.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            parser: DocumentParser::new(config.content_dir),
            pages_dir: config.pages_dir,
            reload_lock: Mutex::new(()),
            current: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Root directory of blog documents.
    #[must_use]
    pub fn content_dir(&self) -> &Path {
        self.parser.content_root()
    }

    /// Parser configured for this store's content root.
    #[must_use]
    pub fn parser(&self) -> &DocumentParser {
        &self.parser
    }

    /// Current snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap())
    }

    /// Rebuild the snapshot from disk.
    ///
    /// Documents that fail to parse, and documents repeating an existing
    /// key, are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the content root cannot be read. The
    /// previous snapshot stays in place.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn reload(&self) -> Result<ReloadStats, StoreError> {
        let _guard = self.reload_lock.lock().unwrap();
        let start = Instant::now();

        let root = self.parser.content_root();
        let paths = scanner::scan_documents(root).map_err(|source| StoreError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let results: Vec<_> = paths
            .par_iter()
            .map(|path| (path, self.parser.parse(path)))
            .collect();

        let mut documents: Vec<Document> = Vec::with_capacity(results.len());
        let mut failed = 0;
        for (path, result) in results {
            match result {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping document");
                    failed += 1;
                }
            }
        }

        let parsed = documents.len();
        let pages = self.load_pages();
        let snapshot = Snapshot::build(documents, pages);

        let stats = ReloadStats {
            documents: snapshot.len(),
            published: snapshot.published_len(),
            pages: snapshot.pages().len(),
            skipped: failed + (parsed - snapshot.len()),
            elapsed_ms: elapsed_ms(start),
        };

        *self.current.write().unwrap() = Arc::new(snapshot);

        tracing::info!(
            documents = stats.documents,
            published = stats.published,
            pages = stats.pages,
            skipped = stats.skipped,
            elapsed_ms = stats.elapsed_ms,
            "Content reloaded"
        );

        Ok(stats)
    }

    fn load_pages(&self) -> Vec<Page> {
        scanner::scan_flat(&self.pages_dir)
            .iter()
            .filter_map(|path| match self.parser.parse_page(path) {
                Ok(page) => Some(page),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping page");
                    None
                }
            })
            .collect()
    }

    /// One page of published records. See [`Snapshot::paginate`].
    #[must_use]
    pub fn paginate(&self, page: usize, per_page: usize) -> Pagination {
        self.snapshot().paginate(page, per_page)
    }

    /// Find a record (draft or published) by category and slug, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record has that key.
    pub fn lookup(&self, category: &str, slug: &str) -> Result<Arc<Document>, StoreError> {
        self.snapshot()
            .lookup(category, slug)
            .ok_or_else(|| StoreError::NotFound(format!("{category}/{slug}")))
    }

    /// Newer and older neighbours of a published record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record is not in the published
    /// sequence (drafts included).
    pub fn adjacent(&self, record: &Document) -> Result<Adjacent, StoreError> {
        self.snapshot()
            .adjacent(record)
            .ok_or_else(|| StoreError::NotFound(record.file_path.display().to_string()))
    }

    /// Published records sharing tags with `record`. See [`Snapshot::related`].
    #[must_use]
    pub fn related(&self, record: &Document, limit: usize) -> Vec<Arc<Document>> {
        self.snapshot().related(record, limit)
    }

    /// Tag frequencies over published records.
    #[must_use]
    pub fn tags(&self) -> Vec<TagCount> {
        self.snapshot().tags()
    }

    /// Published records with the exact tag.
    #[must_use]
    pub fn posts_by_tag(&self, tag: &str) -> Vec<Arc<Document>> {
        self.snapshot().posts_by_tag(tag)
    }

    /// Category counts over published records.
    #[must_use]
    pub fn categories(&self) -> Vec<CategoryCount> {
        self.snapshot().categories()
    }

    /// Published records in a category, pinned first.
    #[must_use]
    pub fn posts_by_category(&self, category: &str) -> Vec<Arc<Document>> {
        self.snapshot().posts_by_category(category)
    }

    /// Administrative listing of every record, drafts included.
    #[must_use]
    pub fn all_including_drafts(&self) -> Vec<Arc<Document>> {
        self.snapshot().all_including_drafts()
    }

    /// All standalone pages.
    #[must_use]
    pub fn pages(&self) -> Vec<Arc<Page>> {
        self.snapshot().pages().to_vec()
    }

    /// Standalone pages shown in navigation.
    #[must_use]
    pub fn visible_pages(&self) -> Vec<Arc<Page>> {
        self.snapshot().visible_pages()
    }
}
