//! Markdown document parsing for Quill.
//!
//! This crate turns one content file into a structured record:
//! - [`DocumentParser`]: Reads a file, splits YAML front matter, renders HTML
//! - [`Document`] / [`Page`]: Parsed blog record and standalone page
//! - Derived fields: summary, word count, reading time, table of contents
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use quill_content::DocumentParser;
//!
//! let parser = DocumentParser::new("content/blog");
//! let doc = parser.parse(Path::new("content/blog/tech/hello.md"))?;
//!
//! assert_eq!(doc.category, "tech");
//! println!("{} ({} min)", doc.title, doc.reading_time);
//! # Ok(())
//! # }
//! ```

pub(crate) mod document;
mod markdown;
pub(crate) mod metadata;
pub(crate) mod stats;
pub(crate) mod text;
pub(crate) mod toc;

pub use document::{Document, DocumentParser, Page, ParseError, UNCATEGORIZED, document_key};
pub use metadata::{DocumentMetadata, MetadataError};
pub use stats::{TextStats, text_stats};
pub use text::{SUMMARY_LENGTH, plain_text, summarize};
pub use toc::{TocEntry, build_toc};
