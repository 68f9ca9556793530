//! Immutable view of the content tree at one point in time.
//!
//! A [`Snapshot`] owns a single collection of records. The published
//! sequence and the key mapping are both index views over that collection,
//! so every published record is reachable by key and every non-draft keyed
//! record appears in the published sequence exactly once.
//!
//! # Ordering
//!
//! Records are sorted by date descending (undated records last), then slug,
//! category and file path ascending. The secondary keys make the order of
//! records sharing a date stable across reloads.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use quill_content::{Document, Page, document_key};
use serde::Serialize;

/// Page size used when a caller passes zero.
pub const DEFAULT_PER_PAGE: usize = 10;

/// One page of the published sequence.
#[derive(Clone, Debug, Serialize)]
pub struct Pagination {
    /// Records on this page (empty when out of range).
    pub records: Vec<Arc<Document>>,
    /// 1-based page index after clamping.
    pub current_page: usize,
    /// `ceil(total / per_page)`.
    pub total_pages: usize,
    /// A page exists before this one.
    pub has_prev: bool,
    /// A page exists after this one.
    pub has_next: bool,
    /// `current_page - 1`.
    pub prev_page: usize,
    /// `current_page + 1`.
    pub next_page: usize,
}

/// Chronological neighbours of a published record.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Adjacent {
    /// Next record forward in time.
    pub newer: Option<Arc<Document>>,
    /// Previous record back in time.
    pub older: Option<Arc<Document>>,
}

/// Tag with the number of published records carrying it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Category with the number of published records in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Content store state.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// All records (drafts included) in display order.
    records: Vec<Arc<Document>>,
    /// Indices into `records` of non-draft records.
    published: Vec<usize>,
    /// Composite key to index into `records`.
    by_key: HashMap<String, usize>,
    /// Standalone pages ordered by slug.
    pages: Vec<Arc<Page>>,
}

/// Display order: date descending, then slug, category and path ascending.
fn display_order(a: &Document, b: &Document) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.slug.cmp(&b.slug))
        .then_with(|| a.category.cmp(&b.category))
        .then_with(|| a.file_path.cmp(&b.file_path))
}

impl Snapshot {
    /// Build a snapshot from parsed records.
    ///
    /// `documents` must be in scan order. When two records share a composite
    /// key, the first one wins and the rest are dropped with a warning. This
    /// holds even when the first is a draft, which then hides a later
    /// published record with the same key.
    #[must_use]
    pub fn build(documents: Vec<Document>, mut pages: Vec<Page>) -> Self {
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(documents.len());
        let mut records: Vec<Arc<Document>> = Vec::with_capacity(documents.len());

        for doc in documents {
            let key = doc.key();
            if let Some(&first) = seen.get(&key) {
                tracing::warn!(
                    key = %key,
                    path = %doc.file_path.display(),
                    kept = %records[first].file_path.display(),
                    "Duplicate document key, skipping"
                );
                continue;
            }
            seen.insert(key, records.len());
            records.push(Arc::new(doc));
        }

        records.sort_by(|a, b| display_order(a, b));

        let by_key = records
            .iter()
            .enumerate()
            .map(|(i, doc)| (doc.key(), i))
            .collect();
        let published = records
            .iter()
            .enumerate()
            .filter(|(_, doc)| !doc.draft)
            .map(|(i, _)| i)
            .collect();

        pages.sort_by(|a, b| a.slug.cmp(&b.slug));

        Self {
            records,
            published,
            by_key,
            pages: pages.into_iter().map(Arc::new).collect(),
        }
    }

    /// Number of records, drafts included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of published records.
    #[must_use]
    pub fn published_len(&self) -> usize {
        self.published.len()
    }

    /// Published records in display order.
    pub fn published(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.published.iter().map(|&i| &self.records[i])
    }

    /// Slice the published sequence into pages.
    ///
    /// `page < 1` is treated as 1 and `per_page == 0` as [`DEFAULT_PER_PAGE`].
    /// A page past the end returns no records but still reports the real
    /// `total_pages`.
    #[must_use]
    pub fn paginate(&self, page: usize, per_page: usize) -> Pagination {
        let page = page.max(1);
        let per_page = if per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            per_page
        };

        let total = self.published.len();
        let total_pages = total.div_ceil(per_page);
        let start = (page - 1).saturating_mul(per_page);
        let records = if start >= total {
            Vec::new()
        } else {
            let end = (start + per_page).min(total);
            self.published[start..end]
                .iter()
                .map(|&i| Arc::clone(&self.records[i]))
                .collect()
        };

        Pagination {
            records,
            current_page: page,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
            prev_page: page - 1,
            next_page: page.saturating_add(1),
        }
    }

    /// Find a record (draft or published) by category and slug.
    ///
    /// Matching is case-insensitive.
    #[must_use]
    pub fn lookup(&self, category: &str, slug: &str) -> Option<Arc<Document>> {
        self.by_key
            .get(&document_key(category, slug))
            .map(|&i| Arc::clone(&self.records[i]))
    }

    /// Neighbours of `record` in the published sequence.
    ///
    /// Returns `None` if no published record has the same `file_path`.
    #[must_use]
    pub fn adjacent(&self, record: &Document) -> Option<Adjacent> {
        let position = self
            .published
            .iter()
            .position(|&i| self.records[i].file_path == record.file_path)?;

        let at = |pos: usize| Arc::clone(&self.records[self.published[pos]]);
        Some(Adjacent {
            newer: position.checked_sub(1).map(at),
            older: (position + 1 < self.published.len()).then(|| at(position + 1)),
        })
    }

    /// Published records ranked by the number of tags shared with `record`.
    ///
    /// The record itself and records sharing no tags are excluded. Ties are
    /// broken by date descending.
    #[must_use]
    pub fn related(&self, record: &Document, limit: usize) -> Vec<Arc<Document>> {
        if record.tags.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &Arc<Document>)> = self
            .published()
            .filter(|doc| doc.file_path != record.file_path)
            .filter_map(|doc| {
                let score = doc.tags.iter().filter(|t| record.has_tag(t)).count();
                (score > 0).then_some((score, doc))
            })
            .collect();

        // Stable sort keeps display order for equal score and date
        scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| b.date.cmp(&a.date)));

        scored
            .into_iter()
            .take(limit)
            .map(|(_, doc)| Arc::clone(doc))
            .collect()
    }

    /// Tag frequencies over published records.
    ///
    /// Sorted by count descending, then name.
    #[must_use]
    pub fn tags(&self) -> Vec<TagCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for doc in self.published() {
            for tag in &doc.tags {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }

        let mut tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(name, count)| TagCount {
                name: name.to_owned(),
                count,
            })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        tags
    }

    /// Published records carrying `tag` (exact match), in display order.
    #[must_use]
    pub fn posts_by_tag(&self, tag: &str) -> Vec<Arc<Document>> {
        self.published()
            .filter(|doc| doc.has_tag(tag))
            .map(Arc::clone)
            .collect()
    }

    /// Published record counts per category, sorted by name.
    #[must_use]
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for doc in self.published() {
            *counts.entry(doc.category.as_str()).or_default() += 1;
        }

        let mut categories: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(name, count)| CategoryCount {
                name: name.to_owned(),
                count,
            })
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    /// Published records in `category`, pinned records first.
    #[must_use]
    pub fn posts_by_category(&self, category: &str) -> Vec<Arc<Document>> {
        let mut posts: Vec<Arc<Document>> = self
            .published()
            .filter(|doc| doc.category == category)
            .map(Arc::clone)
            .collect();
        posts.sort_by_key(|doc| !doc.pinned);
        posts
    }

    /// Every record, drafts included, in display order.
    #[must_use]
    pub fn all_including_drafts(&self) -> Vec<Arc<Document>> {
        self.records.clone()
    }

    /// Standalone pages ordered by slug.
    #[must_use]
    pub fn pages(&self) -> &[Arc<Page>] {
        &self.pages
    }

    /// Standalone pages not marked hidden.
    #[must_use]
    pub fn visible_pages(&self) -> Vec<Arc<Page>> {
        self.pages
            .iter()
            .filter(|page| !page.hidden)
            .map(Arc::clone)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use quill_content::DocumentParser;

    use super::*;

    struct DocFixture<'a> {
        category: &'a str,
        slug: &'a str,
        date: Option<&'a str>,
        tags: &'a [&'a str],
        draft: bool,
        pinned: bool,
    }

    impl Default for DocFixture<'_> {
        fn default() -> Self {
            Self {
                category: "tech",
                slug: "post",
                date: Some("2024-01-01"),
                tags: &[],
                draft: false,
                pinned: false,
            }
        }
    }

    fn doc(fixture: DocFixture<'_>) -> Document {
        let mut front = format!("---\ntitle: {}\n", fixture.slug);
        if let Some(date) = fixture.date {
            front.push_str(&format!("date: {date}\n"));
        }
        front.push_str(&format!("tags: [{}]\n", fixture.tags.join(", ")));
        front.push_str(&format!(
            "draft: {}\npinned: {}\n---\n\nBody.\n",
            fixture.draft, fixture.pinned
        ));

        let path = PathBuf::from(format!("/blog/{}/{}.md", fixture.category, fixture.slug));
        DocumentParser::new("/blog")
            .parse_source(&path, &front)
            .unwrap()
    }

    fn dated(slug: &str, date: &str) -> Document {
        doc(DocFixture {
            slug,
            date: Some(date),
            ..DocFixture::default()
        })
    }

    fn tagged(slug: &str, date: &str, tags: &[&str]) -> Document {
        doc(DocFixture {
            slug,
            date: Some(date),
            tags,
            ..DocFixture::default()
        })
    }

    fn slugs<'a>(docs: impl IntoIterator<Item = &'a Arc<Document>>) -> Vec<&'a str> {
        docs.into_iter().map(|d| d.slug.as_str()).collect()
    }

    fn three_posts() -> Snapshot {
        Snapshot::build(
            vec![
                dated("jan", "2024-01-01"),
                dated("mar", "2024-03-01"),
                dated("feb", "2024-02-01"),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_build_sorts_by_date_descending() {
        let snapshot = three_posts();
        assert_eq!(slugs(snapshot.published()), vec!["mar", "feb", "jan"]);
    }

    #[test]
    fn test_build_equal_dates_ordered_by_slug() {
        let snapshot = Snapshot::build(
            vec![
                dated("zeta", "2024-05-05"),
                dated("alpha", "2024-05-05"),
                dated("mid", "2024-05-05"),
            ],
            Vec::new(),
        );
        assert_eq!(slugs(snapshot.published()), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_build_undated_records_sort_last() {
        let snapshot = Snapshot::build(
            vec![
                doc(DocFixture {
                    slug: "undated",
                    date: None,
                    ..DocFixture::default()
                }),
                dated("old", "1999-12-31"),
            ],
            Vec::new(),
        );
        assert_eq!(slugs(snapshot.published()), vec!["old", "undated"]);
    }

    #[test]
    fn test_build_drafts_only_in_mapping() {
        let snapshot = Snapshot::build(
            vec![
                dated("public", "2024-01-01"),
                doc(DocFixture {
                    slug: "secret",
                    draft: true,
                    ..DocFixture::default()
                }),
            ],
            Vec::new(),
        );

        assert_eq!(slugs(snapshot.published()), vec!["public"]);
        assert!(snapshot.lookup("tech", "secret").is_some());
        assert_eq!(snapshot.len(), 2);
        for doc in snapshot.published() {
            assert!(snapshot.lookup(&doc.category, &doc.slug).is_some());
        }
    }

    #[test]
    fn test_build_duplicate_key_keeps_first() {
        let mut first = dated("dup", "2024-01-01");
        first.file_path = PathBuf::from("/blog/tech/dup.md");
        let mut second = dated("dup", "2024-06-01");
        second.file_path = PathBuf::from("/blog/tech/z-dup.md");

        let snapshot = Snapshot::build(vec![first, second], Vec::new());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.published_len(), 1);
        let kept = snapshot.lookup("tech", "dup").unwrap();
        assert_eq!(kept.file_path, Path::new("/blog/tech/dup.md"));
    }

    #[test]
    fn test_build_duplicate_key_draft_first_hides_published() {
        let mut draft = dated("dup", "2024-01-01");
        draft.file_path = PathBuf::from("/blog/tech/dup.md");
        draft.draft = true;
        let mut published = dated("dup", "2024-06-01");
        published.file_path = PathBuf::from("/blog/tech/z-dup.md");

        let snapshot = Snapshot::build(vec![draft, published], Vec::new());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.published_len(), 0);
        let kept = snapshot.lookup("tech", "dup").unwrap();
        assert!(kept.draft);
        assert_eq!(kept.file_path, Path::new("/blog/tech/dup.md"));
    }

    #[test]
    fn test_paginate_scenario() {
        let snapshot = three_posts();

        let first = snapshot.paginate(1, 2);
        assert_eq!(slugs(&first.records), vec!["mar", "feb"]);
        assert_eq!(first.total_pages, 2);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let second = snapshot.paginate(2, 2);
        assert_eq!(slugs(&second.records), vec!["jan"]);
        assert_eq!(second.total_pages, 2);
        assert!(!second.has_next);
    }

    #[test]
    fn test_paginate_out_of_range_is_empty() {
        let page = three_posts().paginate(5, 2);
        assert!(page.records.is_empty());
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 5);
    }

    #[test]
    fn test_paginate_clamps_page_and_defaults_size() {
        let snapshot = three_posts();

        let page = snapshot.paginate(0, 0);

        assert_eq!(page.current_page, 1);
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_paginate_never_exceeds_page_size() {
        let snapshot = three_posts();
        for per_page in 1..=4 {
            for page in 0..=5 {
                let result = snapshot.paginate(page, per_page);
                assert!(result.records.len() <= per_page);
                assert_eq!(result.total_pages, 3usize.div_ceil(per_page));
            }
        }
    }

    #[test]
    fn test_paginate_max_page_does_not_overflow() {
        let page = three_posts().paginate(usize::MAX, 10);
        assert!(page.records.is_empty());
        assert_eq!(page.current_page, usize::MAX);
        assert_eq!(page.prev_page, usize::MAX - 1);
        assert_eq!(page.next_page, usize::MAX);
        assert!(page.has_prev);
        assert!(!page.has_next);

        let empty = Snapshot::default().paginate(usize::MAX, usize::MAX);
        assert!(empty.records.is_empty());
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_paginate_empty_snapshot() {
        let page = Snapshot::default().paginate(1, 10);
        assert!(page.records.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let snapshot = Snapshot::build(
            vec![doc(DocFixture {
                category: "Tech",
                slug: "Hello",
                ..DocFixture::default()
            })],
            Vec::new(),
        );

        assert!(snapshot.lookup("tech", "hello").is_some());
        assert!(snapshot.lookup("TECH", "HELLO").is_some());
        assert!(snapshot.lookup("tech", "other").is_none());
    }

    #[test]
    fn test_adjacent_middle_and_ends() {
        let snapshot = three_posts();
        let feb = snapshot.lookup("tech", "feb").unwrap();
        let mar = snapshot.lookup("tech", "mar").unwrap();
        let jan = snapshot.lookup("tech", "jan").unwrap();

        let middle = snapshot.adjacent(&feb).unwrap();
        assert_eq!(middle.newer.unwrap().slug, "mar");
        assert_eq!(middle.older.unwrap().slug, "jan");

        let newest = snapshot.adjacent(&mar).unwrap();
        assert!(newest.newer.is_none());
        assert_eq!(newest.older.unwrap().slug, "feb");

        let oldest = snapshot.adjacent(&jan).unwrap();
        assert_eq!(oldest.newer.unwrap().slug, "feb");
        assert!(oldest.older.is_none());
    }

    #[test]
    fn test_adjacent_unknown_record() {
        let snapshot = three_posts();
        let stranger = dated("stranger", "2024-02-15");
        assert!(snapshot.adjacent(&stranger).is_none());
    }

    #[test]
    fn test_related_ranks_by_shared_tags() {
        let source = tagged("source", "2024-01-01", &["go", "web"]);
        let snapshot = Snapshot::build(
            vec![
                source.clone(),
                tagged("go-only", "2024-03-01", &["go"]),
                tagged("go-web", "2024-02-01", &["go", "web"]),
                tagged("unrelated", "2024-04-01", &["cooking"]),
            ],
            Vec::new(),
        );

        let related = snapshot.related(&source, 5);

        assert_eq!(slugs(&related), vec!["go-web", "go-only"]);
    }

    #[test]
    fn test_related_ties_broken_by_date() {
        let source = tagged("source", "2024-01-01", &["rust"]);
        let snapshot = Snapshot::build(
            vec![
                source.clone(),
                tagged("older", "2023-01-01", &["rust"]),
                tagged("newer", "2024-06-01", &["rust"]),
            ],
            Vec::new(),
        );

        assert_eq!(slugs(&snapshot.related(&source, 5)), vec!["newer", "older"]);
    }

    #[test]
    fn test_related_respects_limit_and_excludes_self() {
        let source = tagged("source", "2024-01-01", &["rust"]);
        let mut docs = vec![source.clone()];
        for i in 0..5 {
            docs.push(tagged(&format!("r{i}"), "2024-02-01", &["rust"]));
        }
        let snapshot = Snapshot::build(docs, Vec::new());

        let related = snapshot.related(&source, 3);

        assert_eq!(related.len(), 3);
        for doc in &related {
            assert_ne!(doc.file_path, source.file_path);
            assert!(doc.tags.iter().any(|t| source.has_tag(t)));
        }
    }

    #[test]
    fn test_related_untagged_source_is_empty() {
        let source = dated("plain", "2024-01-01");
        let snapshot = Snapshot::build(
            vec![source.clone(), tagged("t", "2024-01-02", &["x"])],
            Vec::new(),
        );
        assert!(snapshot.related(&source, 3).is_empty());
    }

    #[test]
    fn test_related_skips_drafts() {
        let source = tagged("source", "2024-01-01", &["rust"]);
        let mut draft = tagged("draft", "2024-02-01", &["rust"]);
        draft.draft = true;
        let snapshot = Snapshot::build(vec![source.clone(), draft], Vec::new());

        assert!(snapshot.related(&source, 3).is_empty());
    }

    #[test]
    fn test_tags_counts_published_only() {
        let mut draft = tagged("draft", "2024-02-01", &["rust", "secret"]);
        draft.draft = true;
        let snapshot = Snapshot::build(
            vec![
                tagged("a", "2024-01-01", &["rust", "web"]),
                tagged("b", "2024-01-02", &["rust"]),
                tagged("c", "2024-01-03", &["go"]),
                draft,
            ],
            Vec::new(),
        );

        assert_eq!(
            snapshot.tags(),
            vec![
                TagCount {
                    name: "rust".to_owned(),
                    count: 2
                },
                TagCount {
                    name: "go".to_owned(),
                    count: 1
                },
                TagCount {
                    name: "web".to_owned(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_posts_by_tag_exact_match() {
        let snapshot = Snapshot::build(
            vec![
                tagged("a", "2024-01-01", &["Rust"]),
                tagged("b", "2024-01-02", &["rust"]),
            ],
            Vec::new(),
        );
        assert_eq!(slugs(&snapshot.posts_by_tag("rust")), vec!["b"]);
    }

    #[test]
    fn test_categories_and_pinned_first() {
        let snapshot = Snapshot::build(
            vec![
                dated("new", "2024-03-01"),
                doc(DocFixture {
                    slug: "pinned",
                    date: Some("2020-01-01"),
                    pinned: true,
                    ..DocFixture::default()
                }),
                doc(DocFixture {
                    category: "life",
                    slug: "trip",
                    ..DocFixture::default()
                }),
            ],
            Vec::new(),
        );

        assert_eq!(
            snapshot.categories(),
            vec![
                CategoryCount {
                    name: "life".to_owned(),
                    count: 1
                },
                CategoryCount {
                    name: "tech".to_owned(),
                    count: 2
                },
            ]
        );
        assert_eq!(
            slugs(&snapshot.posts_by_category("tech")),
            vec!["pinned", "new"]
        );
    }

    #[test]
    fn test_all_including_drafts_sorted() {
        let mut draft = dated("draft", "2024-02-01");
        draft.draft = true;
        let snapshot = Snapshot::build(
            vec![dated("jan", "2024-01-01"), draft, dated("mar", "2024-03-01")],
            Vec::new(),
        );

        assert_eq!(
            slugs(&snapshot.all_including_drafts()),
            vec!["mar", "draft", "jan"]
        );
    }

    #[test]
    fn test_visible_pages() {
        let page = |slug: &str, hidden: bool| Page {
            slug: slug.to_owned(),
            title: slug.to_owned(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            body: String::new(),
            toc: Vec::new(),
            hidden,
            file_path: PathBuf::from(format!("/pages/{slug}.md")),
        };
        let snapshot = Snapshot::build(
            Vec::new(),
            vec![page("links", true), page("about", false)],
        );

        let all: Vec<_> = snapshot.pages().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(all, vec!["about", "links"]);
        let visible: Vec<_> = snapshot
            .visible_pages()
            .iter()
            .map(|p| p.slug.clone())
            .collect();
        assert_eq!(visible, vec!["about".to_owned()]);
    }
}
