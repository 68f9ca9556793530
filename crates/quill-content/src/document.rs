//! Document records and the parser that builds them.

use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::markdown;
use crate::metadata::{DocumentMetadata, MetadataError};
use crate::stats::text_stats;
use crate::text::summarize;
use crate::toc::{TocEntry, build_toc};

/// Category for documents placed directly under the content root.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Date format accepted in front matter.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One parsed content file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Document {
    /// URL-safe identifier, unique within a category.
    pub slug: String,
    /// First directory under the content root, or [`UNCATEGORIZED`].
    pub category: String,
    /// Display title.
    pub title: String,
    /// Rendered HTML with heading anchors.
    pub body: String,
    /// Tags in declaration order.
    pub tags: Vec<String>,
    /// Publication date; `None` sorts as the oldest.
    pub date: Option<NaiveDate>,
    /// Plain-text excerpt.
    pub summary: String,
    /// CJK ideographs plus Latin words.
    pub word_count: usize,
    /// Reading time in minutes (at least 1).
    pub reading_time: u32,
    /// Level-2/3 headings in document order.
    pub toc: Vec<TocEntry>,
    /// Hidden from the public collection.
    pub draft: bool,
    /// Shown ahead of unpinned records in category listings.
    pub pinned: bool,
    /// Source file.
    pub file_path: PathBuf,
}

impl Document {
    /// Composite lookup key: `lowercase(category/slug)`.
    #[must_use]
    pub fn key(&self) -> String {
        document_key(&self.category, &self.slug)
    }

    /// Whether the document carries `tag` (exact match).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Build the composite key for a category and slug.
#[must_use]
pub fn document_key(category: &str, slug: &str) -> String {
    format!("{category}/{slug}").to_lowercase()
}

/// A standalone page (about, contact, ...) outside the blog tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    /// URL identifier.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Date from front matter, if any.
    pub date: Option<NaiveDate>,
    /// Rendered HTML with heading anchors.
    pub body: String,
    /// Level-2/3 headings in document order.
    pub toc: Vec<TocEntry>,
    /// Excluded from navigation.
    pub hidden: bool,
    /// Source file.
    pub file_path: PathBuf,
}

/// Error returned when a single file cannot be turned into a record.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// File could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Front matter is not valid YAML.
    #[error("Invalid metadata in {}: {source}", path.display())]
    Metadata {
        /// File that failed.
        path: PathBuf,
        /// Underlying metadata error.
        #[source]
        source: MetadataError,
    },
    /// Content could not be rendered.
    #[error("Failed to render {}: {message}", path.display())]
    Render {
        /// File that failed.
        path: PathBuf,
        /// Reason.
        message: String,
    },
}

/// Fields shared by documents and pages after the common pipeline steps.
struct Parsed {
    meta: DocumentMetadata,
    title: String,
    slug: String,
    date: Option<NaiveDate>,
    summary: String,
    word_count: usize,
    reading_time: u32,
    body: String,
    toc: Vec<TocEntry>,
}

/// Parses markdown files into [`Document`] records.
///
/// The parser is cheap to clone and holds only the content root, which is
/// needed to derive each document's category.
#[derive(Clone, Debug)]
pub struct DocumentParser {
    content_root: PathBuf,
}

impl DocumentParser {
    /// Create a parser for documents under `content_root`.
    #[must_use]
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
        }
    }

    /// Root directory this parser derives categories from.
    #[must_use]
    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Parse a document file.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] if the file cannot be read,
    /// [`ParseError::Render`] if it is not valid UTF-8, and
    /// [`ParseError::Metadata`] if its front matter is malformed YAML.
    pub fn parse(&self, path: &Path) -> Result<Document, ParseError> {
        let source = read_source(path)?;
        self.parse_source(path, &source)
    }

    /// Parse document content that has already been read.
    ///
    /// `path` is used for the category, the fallback title and slug, and as
    /// the record's `file_path`. It does not need to exist.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Metadata`] if the front matter is malformed YAML.
    pub fn parse_source(&self, path: &Path, source: &str) -> Result<Document, ParseError> {
        let parsed = parse_common(path, source)?;

        Ok(Document {
            category: self.category_for(path),
            slug: parsed.slug,
            title: parsed.title,
            body: parsed.body,
            tags: parsed.meta.tags,
            date: parsed.date,
            summary: parsed.summary,
            word_count: parsed.word_count,
            reading_time: parsed.reading_time,
            toc: parsed.toc,
            draft: parsed.meta.draft,
            pinned: parsed.meta.pinned,
            file_path: path.to_path_buf(),
        })
    }

    /// Parse a standalone page file.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DocumentParser::parse`].
    pub fn parse_page(&self, path: &Path) -> Result<Page, ParseError> {
        let source = read_source(path)?;
        let parsed = parse_common(path, &source)?;

        Ok(Page {
            slug: parsed.slug,
            title: parsed.title,
            date: parsed.date,
            body: parsed.body,
            toc: parsed.toc,
            hidden: parsed.meta.hidden,
            file_path: path.to_path_buf(),
        })
    }

    /// Derive the category from the first directory below the content root.
    ///
    /// Files at the root, and files outside it, are uncategorized.
    fn category_for(&self, path: &Path) -> String {
        let Ok(relative) = path.strip_prefix(&self.content_root) else {
            return UNCATEGORIZED.to_owned();
        };
        let Some(parent) = relative.parent() else {
            return UNCATEGORIZED.to_owned();
        };
        match parent.components().next() {
            Some(Component::Normal(first)) => first.to_string_lossy().into_owned(),
            _ => UNCATEGORIZED.to_owned(),
        }
    }
}

fn read_source(path: &Path) -> Result<String, ParseError> {
    let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| ParseError::Render {
        path: path.to_path_buf(),
        message: format!("invalid UTF-8: {e}"),
    })
}

fn parse_common(path: &Path, source: &str) -> Result<Parsed, ParseError> {
    let rendered = markdown::render(source);
    let meta = match rendered.front_matter.as_deref() {
        Some(yaml) => DocumentMetadata::from_yaml(yaml).map_err(|source| ParseError::Metadata {
            path: path.to_path_buf(),
            source,
        })?,
        None => DocumentMetadata::default(),
    };

    let title = meta.title.clone().unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let slug = meta
        .slug
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
    let date = meta
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), DATE_FORMAT).ok());

    let summary = summarize(&rendered.html);
    let stats = text_stats(&rendered.html);
    let (body, toc) = build_toc(&rendered.html);

    Ok(Parsed {
        meta,
        title,
        slug,
        date,
        summary,
        word_count: stats.word_count,
        reading_time: stats.reading_time,
        body,
        toc,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn parser() -> DocumentParser {
        DocumentParser::new("/site/content/blog")
    }

    #[test]
    fn test_parse_source_full_front_matter() {
        let source = "---\ntitle: Hello World\ndate: 2024-03-01\ntags: [go, web]\nslug: hello\npinned: true\n---\n\n## Intro\n\nFirst post.\n";

        let doc = parser()
            .parse_source(Path::new("/site/content/blog/tech/first.md"), source)
            .unwrap();

        assert_eq!(doc.title, "Hello World");
        assert_eq!(doc.slug, "hello");
        assert_eq!(doc.category, "tech");
        assert_eq!(doc.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(doc.tags, vec!["go".to_owned(), "web".to_owned()]);
        assert!(doc.pinned);
        assert!(!doc.draft);
        assert_eq!(doc.summary, "Intro First post.");
        assert_eq!(doc.toc.len(), 1);
        assert!(doc.body.starts_with("<h2 id=\"heading-1\">Intro</h2>"));
        assert_eq!(doc.key(), "tech/hello");
    }

    #[test]
    fn test_parse_source_fallbacks() {
        let doc = parser()
            .parse_source(Path::new("/site/content/blog/notes.md"), "Just text.\n")
            .unwrap();

        assert_eq!(doc.title, "notes.md");
        assert_eq!(doc.slug, "notes");
        assert_eq!(doc.category, UNCATEGORIZED);
        assert_eq!(doc.date, None);
        assert!(doc.tags.is_empty());
        assert_eq!(doc.reading_time, 1);
    }

    #[test]
    fn test_parse_source_empty_slug_uses_file_stem() {
        let doc = parser()
            .parse_source(
                Path::new("/site/content/blog/life/trip.md"),
                "---\nslug: \"\"\n---\nBody\n",
            )
            .unwrap();
        assert_eq!(doc.slug, "trip");
    }

    #[test]
    fn test_parse_source_bad_date_is_none() {
        let doc = parser()
            .parse_source(
                Path::new("/site/content/blog/a.md"),
                "---\ndate: March 1st\n---\nBody\n",
            )
            .unwrap();
        assert_eq!(doc.date, None);
    }

    #[test]
    fn test_category_uses_first_segment() {
        let p = parser();
        let cases = [
            ("/site/content/blog/tech/post.md", "tech"),
            ("/site/content/blog/tech/backend/deep.md", "tech"),
            ("/site/content/blog/root.md", UNCATEGORIZED),
            ("/elsewhere/post.md", UNCATEGORIZED),
        ];
        for (path, expected) in cases {
            assert_eq!(p.category_for(Path::new(path)), expected, "{path}");
        }
    }

    #[test]
    fn test_parse_source_malformed_metadata() {
        let result = parser().parse_source(
            Path::new("/site/content/blog/bad.md"),
            "---\ntitle: [unclosed\n---\nBody\n",
        );
        assert!(matches!(result, Err(ParseError::Metadata { .. })));
    }

    #[test]
    fn test_parse_reads_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("blog");
        fs::create_dir_all(root.join("tech")).unwrap();
        let path = root.join("tech/rust.md");
        fs::write(&path, "---\ntitle: Rust\ndraft: true\n---\n\nBody.\n").unwrap();

        let doc = DocumentParser::new(&root).parse(&path).unwrap();

        assert_eq!(doc.title, "Rust");
        assert_eq!(doc.category, "tech");
        assert!(doc.draft);
        assert_eq!(doc.file_path, path);
    }

    #[test]
    fn test_parse_missing_file() {
        let result = parser().parse(Path::new("/nonexistent/blog/missing.md"));
        assert!(matches!(result, Err(ParseError::Io { .. })));
    }

    #[test]
    fn test_parse_invalid_utf8() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("binary.md");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let result = DocumentParser::new(temp_dir.path()).parse(&path);

        assert!(matches!(result, Err(ParseError::Render { .. })));
    }

    #[test]
    fn test_parse_page_hidden() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("about.md");
        fs::write(&path, "---\ntitle: About\nhidden: true\n---\n\nWho I am.\n").unwrap();

        let page = DocumentParser::new(temp_dir.path())
            .parse_page(&path)
            .unwrap();

        assert_eq!(page.title, "About");
        assert_eq!(page.slug, "about");
        assert!(page.hidden);
        assert_eq!(page.body, "<p>Who I am.</p>\n");
    }

    #[test]
    fn test_document_key_lowercases() {
        assert_eq!(document_key("Tech", "Hello-World"), "tech/hello-world");
    }
}
