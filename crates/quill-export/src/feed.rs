//! RSS 2.0 feed generation.

use std::fmt::Write;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use quill_config::SiteConfig;
use quill_content::Document;

use crate::routes::{post_route, route_url};
use crate::sitemap::escape_xml;

/// Number of most recent records included in the feed.
pub(crate) const FEED_LIMIT: usize = 20;

/// RFC 2822 style timestamp used by RSS readers.
const RSS_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Render the feed for `records`, which must already be in display order.
///
/// Only the first [`FEED_LIMIT`] exported records are included. Undated
/// records carry no `pubDate`.
pub(crate) fn render_feed(
    site: &SiteConfig,
    records: &[Arc<Document>],
    now: DateTime<Utc>,
) -> String {
    let base = &site.base_url;
    let mut xml = String::with_capacity(4096);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<rss version=\"2.0\">\n<channel>\n");
    let _ = writeln!(xml, "  <title>{}</title>", escape_xml(&site.title));
    let _ = writeln!(xml, "  <link>{}/</link>", escape_xml(base));
    let _ = writeln!(
        xml,
        "  <description>{}</description>",
        escape_xml(&site.description)
    );
    let _ = writeln!(
        xml,
        "  <lastBuildDate>{}</lastBuildDate>",
        now.format(RSS_DATE_FORMAT)
    );

    let items = records
        .iter()
        .filter_map(|doc| post_route(doc).map(|route| (doc, route)))
        .take(FEED_LIMIT);
    for (doc, route) in items {
        let link = escape_xml(&route_url(base, &route));
        xml.push_str("  <item>\n");
        let _ = writeln!(xml, "    <title>{}</title>", escape_xml(&doc.title));
        let _ = writeln!(xml, "    <link>{link}</link>");
        let _ = writeln!(xml, "    <guid>{link}</guid>");
        let _ = writeln!(xml, "    <description>{}</description>", cdata(&doc.summary));
        if let Some(date) = doc.date {
            let _ = writeln!(xml, "    <pubDate>{}</pubDate>", format_date(date));
        }
        xml.push_str("  </item>\n");
    }

    xml.push_str("</channel>\n</rss>\n");
    xml
}

/// Midnight UTC of `date` in RSS format.
fn format_date(date: NaiveDate) -> String {
    date.and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .format(RSS_DATE_FORMAT)
        .to_string()
}

/// Wrap text in a CDATA section, splitting any embedded terminator.
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use quick_xml::Reader;
    use quick_xml::events::Event;
    use quill_content::DocumentParser;

    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            title: "Notes & Essays".to_owned(),
            description: "Writing".to_owned(),
            base_url: "https://example.com".to_owned(),
        }
    }

    fn doc(path: &str, source: &str) -> Arc<Document> {
        let parser = DocumentParser::new("/blog");
        Arc::new(
            parser
                .parse_source(&std::path::Path::new("/blog").join(path), source)
                .unwrap(),
        )
    }

    /// Parse with quick-xml and return the text of every `<pubDate>` and the item count.
    fn inspect(xml: &str) -> (usize, Vec<String>, Vec<String>) {
        let mut reader = Reader::from_str(xml);
        let mut items = 0;
        let mut dates = Vec::new();
        let mut cdata = Vec::new();
        let mut in_date = false;
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    in_date = e.name().as_ref() == b"pubDate";
                    if e.name().as_ref() == b"item" {
                        items += 1;
                    }
                }
                Ok(Event::Text(t)) if in_date => {
                    dates.push(String::from_utf8(t.to_vec()).unwrap());
                }
                Ok(Event::CData(c)) => cdata.push(String::from_utf8(c.to_vec()).unwrap()),
                Ok(Event::End(_)) => in_date = false,
                Ok(Event::Eof) => break,
                Err(e) => panic!("malformed feed: {e}"),
                _ => {}
            }
        }
        (items, dates, cdata)
    }

    #[test]
    fn test_feed_is_well_formed() {
        let records = vec![
            doc(
                "tech/a.md",
                "---\ntitle: Tom & Jerry <3\ndate: 2024-03-05\n---\nSome ]]> tricky text.",
            ),
            doc("tech/b.md", "---\ntitle: Undated\n---\nBody."),
        ];
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();

        let xml = render_feed(&site(), &records, now);
        let (items, dates, cdata) = inspect(&xml);

        assert_eq!(items, 2);
        assert_eq!(dates, vec!["Tue, 05 Mar 2024 00:00:00 +0000"]);
        assert_eq!(cdata.concat(), "Some ]]> tricky text.Body.");
        assert!(xml.contains("<lastBuildDate>Wed, 06 Mar 2024 12:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains("<link>https://example.com/tech/a.html</link>"));
        assert!(xml.contains("<title>Notes &amp; Essays</title>"));
    }

    #[test]
    fn test_feed_links_match_exported_files() {
        let records = vec![
            doc("tech/a.md", "---\nslug: 2024/hello\n---\nBody."),
            doc("tech/b.md", "---\nslug: \"..\"\n---\nBody."),
        ];

        let xml = render_feed(&site(), &records, Utc::now());

        assert_eq!(inspect(&xml).0, 1);
        assert!(xml.contains("<link>https://example.com/tech/2024-hello.html</link>"));
        assert!(!xml.contains("/tech/2024/hello.html"));
    }

    #[test]
    fn test_feed_limited_to_latest() {
        let records: Vec<_> = (0..25)
            .map(|i| doc(&format!("tech/p{i}.md"), "Body"))
            .collect();

        let xml = render_feed(&site(), &records, Utc::now());

        assert_eq!(inspect(&xml).0, FEED_LIMIT);
        assert!(xml.contains("/tech/p19.html"));
        assert!(!xml.contains("/tech/p20.html"));
    }
}
