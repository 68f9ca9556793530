//! Static site export.
//!
//! # Architecture
//!
//! An export takes one snapshot from the store and renders every section
//! from it, so the output is consistent even if the store reloads midway.
//! Sections run in a fixed order and the first failure aborts the export.
//! Files already written stay on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use quill_config::{Config, SiteConfig};
use quill_content::{Document, Page};
use quill_store::{CategoryCount, ContentStore, Snapshot, TagCount};
use serde::Serialize;
use serde_json::Value;

use crate::feed::render_feed;
use crate::routes::{
    category_route, index_route, page_route, post_route, route_file, route_url, shadows_section,
    tag_route,
};
use crate::sitemap::render_sitemap;
use crate::template::{Context, TemplateError, Templates};

/// Number of related records shown on a post page.
const RELATED_LIMIT: usize = 3;

/// Error returned by [`StaticExporter::generate`].
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A section failed; wraps the underlying cause.
    #[error("Failed to export {section}: {source}")]
    Section {
        /// Section name, e.g. `"posts"`.
        section: &'static str,
        /// Underlying error.
        #[source]
        source: Box<ExportError>,
    },
    /// Template failed to load or render.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// Template context could not be serialized.
    #[error("Failed to build template context: {0}")]
    Context(#[from] serde_json::Error),
    /// Output could not be written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    fn section(section: &'static str) -> impl FnOnce(ExportError) -> ExportError {
        move |source| ExportError::Section {
            section,
            source: Box::new(source),
        }
    }

    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
        move |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Export settings.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// Root of the generated tree.
    pub output_dir: PathBuf,
    /// Site identity passed to every template and the feed.
    pub site: SiteConfig,
    /// Records per index page.
    pub posts_per_page: usize,
    /// Theme static assets copied to `static/`, if present.
    pub static_dir: Option<PathBuf>,
}

impl ExportConfig {
    /// Settings from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            site: config.site.clone(),
            posts_per_page: config.posts_per_page,
            static_dir: Some(config.static_dir()),
        }
    }
}

/// Counters reported by a finished export.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExportStats {
    /// Post pages written.
    pub posts: usize,
    /// Home index pages written.
    pub index_pages: usize,
    /// Category pages written.
    pub categories: usize,
    /// Tag pages written.
    pub tags: usize,
    /// Standalone pages written.
    pub pages: usize,
    /// Static asset files copied.
    pub static_files: usize,
    /// Wall time of the export.
    pub elapsed_ms: f64,
}

/// A post as templates see it: every record field plus its `url`.
///
/// `url` is null for posts that are not exported.
#[derive(Serialize)]
struct PostView<'a> {
    #[serde(flatten)]
    post: &'a Document,
    url: Option<String>,
}

#[derive(Serialize)]
struct PageView<'a> {
    #[serde(flatten)]
    page: &'a Page,
    url: Option<String>,
}

/// Category or tag link, with its post count in list views.
#[derive(Serialize)]
struct LinkView<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    url: Option<String>,
}

/// Writes the whole site as static HTML.
pub struct StaticExporter<T> {
    config: ExportConfig,
    templates: T,
}

impl<T: Templates> StaticExporter<T> {
    /// Create an exporter rendering with `templates`.
    #[must_use]
    pub fn new(config: ExportConfig, templates: T) -> Self {
        Self { config, templates }
    }

    /// Export settings.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Generate the site from the store's current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Section` naming the first section that failed.
    pub fn generate(&self, store: &ContentStore) -> Result<ExportStats, ExportError> {
        let start = Instant::now();
        let snapshot = store.snapshot();
        let base = self.base_context(&snapshot)?;
        let out = &self.config.output_dir;

        fs::create_dir_all(out).map_err(ExportError::io(out))?;

        let mut stats = ExportStats {
            static_files: self
                .copy_static()
                .map_err(ExportError::section("static assets"))?,
            index_pages: self
                .export_index(&snapshot, &base)
                .map_err(ExportError::section("index"))?,
            posts: self
                .export_posts(&snapshot, &base)
                .map_err(ExportError::section("posts"))?,
            categories: self
                .export_categories(&snapshot, &base)
                .map_err(ExportError::section("categories"))?,
            tags: self
                .export_tags(&snapshot, &base)
                .map_err(ExportError::section("tags"))?,
            pages: self
                .export_pages(&snapshot, &base)
                .map_err(ExportError::section("pages"))?,
            elapsed_ms: 0.0,
        };

        let records: Vec<_> = snapshot.published().cloned().collect();
        let feed = render_feed(&self.config.site, &records, chrono::Utc::now());
        write_output(&out.join("feed.xml"), &feed).map_err(ExportError::section("feed"))?;

        let sitemap = render_sitemap(&self.config.site.base_url, &snapshot);
        write_output(&out.join("sitemap.xml"), &sitemap)
            .map_err(ExportError::section("sitemap"))?;

        stats.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            output = %out.display(),
            posts = stats.posts,
            index_pages = stats.index_pages,
            categories = stats.categories,
            tags = stats.tags,
            pages = stats.pages,
            elapsed_ms = stats.elapsed_ms,
            "Site exported"
        );
        Ok(stats)
    }

    /// Values shared by every template: site identity and navigation.
    fn base_context(&self, snapshot: &Snapshot) -> Result<Context, ExportError> {
        let categories = snapshot.categories();
        let pages = snapshot.visible_pages();
        let mut context = Context::new();
        insert(&mut context, "site", &self.config.site)?;
        insert(&mut context, "nav_categories", &self.category_links(&categories))?;
        insert(&mut context, "nav_pages", &self.page_views(&pages))?;
        Ok(context)
    }

    fn url(&self, route: Option<String>) -> Option<String> {
        route.map(|route| route_url(&self.config.site.base_url, &route))
    }

    fn post_view<'a>(&self, doc: &'a Document) -> PostView<'a> {
        PostView {
            post: doc,
            url: self.url(post_route(doc)),
        }
    }

    fn post_views<'a>(&self, docs: &'a [Arc<Document>]) -> Vec<PostView<'a>> {
        docs.iter().map(|doc| self.post_view(doc)).collect()
    }

    fn page_view<'a>(&self, page: &'a Page) -> PageView<'a> {
        PageView {
            page,
            url: self.url(page_route(page)),
        }
    }

    fn page_views<'a>(&self, pages: &'a [Arc<Page>]) -> Vec<PageView<'a>> {
        pages.iter().map(|page| self.page_view(page)).collect()
    }

    fn category_links<'a>(&self, categories: &'a [CategoryCount]) -> Vec<LinkView<'a>> {
        categories
            .iter()
            .map(|c| LinkView {
                name: &c.name,
                count: Some(c.count),
                url: self.url(category_route(&c.name)),
            })
            .collect()
    }

    fn tag_links<'a>(&self, tags: &'a [TagCount]) -> Vec<LinkView<'a>> {
        tags.iter()
            .map(|t| LinkView {
                name: &t.name,
                count: Some(t.count),
                url: self.url(tag_route(&t.name)),
            })
            .collect()
    }

    fn render_to(&self, template: &str, context: &Context, path: &Path) -> Result<(), ExportError> {
        let html = self.templates.render(template, context)?;
        write_output(path, &html)
    }

    fn copy_static(&self) -> Result<usize, ExportError> {
        match &self.config.static_dir {
            Some(dir) if dir.is_dir() => copy_dir(dir, &self.config.output_dir.join("static")),
            _ => Ok(0),
        }
    }

    fn export_index(&self, snapshot: &Snapshot, base: &Context) -> Result<usize, ExportError> {
        let per_page = self.config.posts_per_page;
        let total_pages = snapshot.paginate(1, per_page).total_pages.max(1);

        for n in 1..=total_pages {
            let page = snapshot.paginate(n, per_page);
            let prev_url = page.has_prev.then(|| index_route(page.prev_page));
            let next_url = page.has_next.then(|| index_route(page.next_page));

            let mut context = base.clone();
            insert(&mut context, "posts", &self.post_views(&page.records))?;
            insert(&mut context, "current_page", &page.current_page)?;
            insert(&mut context, "total_pages", &total_pages)?;
            insert(&mut context, "has_prev", &page.has_prev)?;
            insert(&mut context, "has_next", &page.has_next)?;
            insert(&mut context, "prev_page", &page.prev_page)?;
            insert(&mut context, "next_page", &page.next_page)?;
            insert(&mut context, "prev_url", &self.url(prev_url))?;
            insert(&mut context, "next_url", &self.url(next_url))?;

            let path = route_file(&self.config.output_dir, &index_route(n));
            self.render_to("index.html", &context, &path)?;
        }
        Ok(total_pages)
    }

    fn export_posts(&self, snapshot: &Snapshot, base: &Context) -> Result<usize, ExportError> {
        let mut written = 0;
        for doc in snapshot.published() {
            let Some(route) = post_route(doc) else {
                tracing::warn!(
                    path = %doc.file_path.display(),
                    "Skipping post with unsafe output path"
                );
                continue;
            };
            let adjacent = snapshot.adjacent(doc).unwrap_or_default();
            let related = snapshot.related(doc, RELATED_LIMIT);
            let tags: Vec<LinkView<'_>> = doc
                .tags
                .iter()
                .map(|tag| LinkView {
                    name: tag,
                    count: None,
                    url: self.url(tag_route(tag)),
                })
                .collect();

            let mut context = base.clone();
            insert(&mut context, "post", &self.post_view(doc))?;
            insert(&mut context, "post_tags", &tags)?;
            insert(
                &mut context,
                "newer",
                &adjacent.newer.as_deref().map(|d| self.post_view(d)),
            )?;
            insert(
                &mut context,
                "older",
                &adjacent.older.as_deref().map(|d| self.post_view(d)),
            )?;
            insert(&mut context, "related", &self.post_views(&related))?;
            insert(&mut context, "comments", &Vec::<Value>::new())?;

            let path = route_file(&self.config.output_dir, &route);
            self.render_to("post.html", &context, &path)?;
            written += 1;
        }
        Ok(written)
    }

    fn export_categories(&self, snapshot: &Snapshot, base: &Context) -> Result<usize, ExportError> {
        let categories = snapshot.categories();
        let mut context = base.clone();
        insert(&mut context, "categories", &self.category_links(&categories))?;
        self.render_to(
            "categories.html",
            &context,
            &route_file(&self.config.output_dir, "categories/"),
        )?;

        let mut written = 0;
        for category in &categories {
            if shadows_section(&category.name) {
                tracing::warn!(
                    category = %category.name,
                    "Category shares an output directory with a generated section"
                );
            }
            let Some(route) = category_route(&category.name) else {
                continue;
            };
            let posts = snapshot.posts_by_category(&category.name);
            let mut context = base.clone();
            insert(&mut context, "category", &category.name)?;
            insert(&mut context, "posts", &self.post_views(&posts))?;
            let path = route_file(&self.config.output_dir, &route);
            self.render_to("category.html", &context, &path)?;
            written += 1;
        }
        Ok(written)
    }

    fn export_tags(&self, snapshot: &Snapshot, base: &Context) -> Result<usize, ExportError> {
        let tags = snapshot.tags();
        let mut context = base.clone();
        insert(&mut context, "tags", &self.tag_links(&tags))?;
        self.render_to(
            "tags.html",
            &context,
            &route_file(&self.config.output_dir, "tags/"),
        )?;

        let mut written = 0;
        for tag in &tags {
            let Some(route) = tag_route(&tag.name) else {
                tracing::warn!(tag = %tag.name, "Skipping tag with unsafe output path");
                continue;
            };
            let posts = snapshot.posts_by_tag(&tag.name);
            let mut context = base.clone();
            insert(&mut context, "tag", &tag.name)?;
            insert(&mut context, "posts", &self.post_views(&posts))?;
            let path = route_file(&self.config.output_dir, &route);
            self.render_to("tag.html", &context, &path)?;
            written += 1;
        }
        Ok(written)
    }

    fn export_pages(&self, snapshot: &Snapshot, base: &Context) -> Result<usize, ExportError> {
        let mut written = 0;
        for page in snapshot.pages() {
            let Some(route) = page_route(page) else {
                continue;
            };
            let mut context = base.clone();
            insert(&mut context, "page", &self.page_view(page))?;
            let path = route_file(&self.config.output_dir, &route);
            self.render_to("page.html", &context, &path)?;
            written += 1;
        }
        Ok(written)
    }
}

fn insert<V: Serialize + ?Sized>(
    context: &mut Context,
    key: &str,
    value: &V,
) -> Result<(), ExportError> {
    context.insert(key.to_owned(), serde_json::to_value(value)?);
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ExportError::io(parent))?;
    }
    fs::write(path, contents).map_err(ExportError::io(path))
}

/// Recursively copy `from` into `to`, returning the number of files copied.
fn copy_dir(from: &Path, to: &Path) -> Result<usize, ExportError> {
    fs::create_dir_all(to).map_err(ExportError::io(to))?;
    let mut copied = 0;
    for entry in fs::read_dir(from).map_err(ExportError::io(from))? {
        let entry = entry.map_err(ExportError::io(from))?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        if source.is_dir() {
            copied += copy_dir(&source, &target)?;
        } else {
            fs::copy(&source, &target).map_err(ExportError::io(&source))?;
            copied += 1;
        }
    }
    Ok(copied)
}
