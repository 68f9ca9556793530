//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url><loc>https://example.com/</loc></url>
//! </urlset>
//! ```

use std::fmt::Write;

use quill_store::Snapshot;

use crate::routes::{category_route, index_route, page_route, post_route, route_url, tag_route};

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Render a sitemap listing the root, every exported record, category, tag
/// and standalone page under `base_url`.
pub(crate) fn render_sitemap(base_url: &str, snapshot: &Snapshot) -> String {
    let mut routes = vec![index_route(1)];
    routes.extend(snapshot.published().filter_map(|doc| post_route(doc)));
    routes.extend(
        snapshot
            .categories()
            .iter()
            .filter_map(|c| category_route(&c.name)),
    );
    routes.extend(snapshot.tags().iter().filter_map(|t| tag_route(&t.name)));
    routes.extend(snapshot.pages().iter().filter_map(|page| page_route(page)));
    let locs: Vec<String> = routes
        .iter()
        .map(|route| route_url(base_url, route))
        .collect();

    let mut xml = String::with_capacity(64 * locs.len() + 128);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{SITEMAP_NS}\">");
    for loc in locs {
        let _ = writeln!(xml, "  <url><loc>{}</loc></url>", escape_xml(&loc));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Escape special XML characters.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
