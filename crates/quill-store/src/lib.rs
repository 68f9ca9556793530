//! In-memory content store for Quill.
//!
//! This crate provides:
//! - [`ContentStore`]: thread-safe store of parsed documents and pages
//! - [`Snapshot`]: immutable view with pagination, lookup and ranking queries
//! - Authoring helpers that create, save and delete document sources
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use quill_store::{ContentStore, StoreConfig};
//!
//! let store = ContentStore::new(StoreConfig {
//!     content_dir: "content/blog".into(),
//!     pages_dir: "content/pages".into(),
//! });
//! store.reload()?;
//!
//! let first = store.paginate(1, 10);
//! for doc in &first.records {
//!     println!("{}/{}: {}", doc.category, doc.slug, doc.title);
//! }
//! # Ok(())
//! # }
//! ```

mod authoring;
mod scanner;
pub(crate) mod snapshot;
pub(crate) mod store;

pub use authoring::{NewDocument, normalize_slug};
pub use snapshot::{Adjacent, CategoryCount, DEFAULT_PER_PAGE, Pagination, Snapshot, TagCount};
pub use store::{ContentStore, ReloadStats, StoreConfig, StoreError};
