//! Full-text search for Quill.
//!
//! [`SearchIndex`] keeps a SQLite FTS5 index of published documents in its
//! own directory. The index is rebuilt wholesale after every store reload;
//! there is no incremental update path.
//!
//! Entries are keyed by slug alone. Indexing a slug that is already present
//! replaces the earlier entry, so documents in different categories that
//! share a slug shadow each other. Hits are mapped back to the first
//! published record carrying the slug.
//!
//! # Example
//!
//! ```no_run
//! # async fn run(store: &quill_store::ContentStore) -> Result<(), quill_search::IndexError> {
//! use quill_search::SearchIndex;
//!
//! let index = SearchIndex::new("data/search");
//! let snapshot = store.snapshot();
//! index.rebuild(&snapshot.all_including_drafts()).await?;
//!
//! for doc in index.search("rust async", &snapshot).await {
//!     println!("{}/{}", doc.category, doc.slug);
//! }
//! # Ok(())
//! # }
//! ```

mod index;

pub use index::{IndexError, SearchIndex};
