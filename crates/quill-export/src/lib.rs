//! Static site export for Quill.
//!
//! [`StaticExporter`] renders the store's published content into a
//! self-contained directory of HTML pages plus `feed.xml` and `sitemap.xml`.
//! Rendering goes through the [`Templates`] trait; [`MiniJinjaTemplates`]
//! loads a theme's layouts from disk.
//!
//! # Output Layout
//!
//! ```text
//! index.html, page/<n>/index.html     home, paginated
//! <category>/<slug>.html              one per published post
//! categories/index.html               category list
//! category/<name>/index.html          posts in a category
//! tags/index.html                     tag list
//! tag/<name>/index.html               posts with a tag
//! page/<slug>.html                    standalone pages
//! static/                             theme assets
//! feed.xml, sitemap.xml
//! ```

mod exporter;
mod feed;
mod routes;
mod sitemap;
mod template;

pub use exporter::{ExportConfig, ExportError, ExportStats, StaticExporter};
pub use template::{Context, MiniJinjaTemplates, TemplateError, Templates};
