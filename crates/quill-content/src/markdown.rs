//! Markdown to HTML rendering.
//!
//! Uses pulldown-cmark with the YAML-style metadata block extension, so the
//! front matter is split from the body by the same parser that renders it.
//! Raw HTML in the source is passed through unchanged.

use pulldown_cmark::{Event, MetadataBlockKind, Options, Parser, Tag, TagEnd, html};

/// Output of rendering one markdown source.
#[derive(Debug)]
pub(crate) struct Rendered {
    /// Rendered HTML body (front matter excluded).
    pub html: String,
    /// Raw YAML of the leading metadata block, if present.
    pub front_matter: Option<String>,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

/// Render markdown source, capturing the YAML front matter separately.
pub(crate) fn render(source: &str) -> Rendered {
    let mut front_matter: Option<String> = None;
    let mut in_metadata = false;

    let events = Parser::new_ext(source, parser_options()).filter_map(|event| match event {
        Event::Start(Tag::MetadataBlock(MetadataBlockKind::YamlStyle)) => {
            in_metadata = true;
            front_matter.get_or_insert_with(String::new);
            None
        }
        Event::End(TagEnd::MetadataBlock(_)) => {
            in_metadata = false;
            None
        }
        Event::Text(text) if in_metadata => {
            front_matter.get_or_insert_with(String::new).push_str(&text);
            None
        }
        other => Some(other),
    });

    let mut html_out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut html_out, events);

    Rendered {
        html: html_out,
        front_matter,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_splits_front_matter() {
        let rendered = render("---\ntitle: Hello\ntags: [a]\n---\n\nBody text.\n");

        assert_eq!(
            rendered.front_matter.as_deref().map(str::trim),
            Some("title: Hello\ntags: [a]")
        );
        assert_eq!(rendered.html, "<p>Body text.</p>\n");
    }

    #[test]
    fn test_render_without_front_matter() {
        let rendered = render("## Heading\n\nText.\n");

        assert_eq!(rendered.front_matter, None);
        assert_eq!(rendered.html, "<h2>Heading</h2>\n<p>Text.</p>\n");
    }

    #[test]
    fn test_render_passes_raw_html() {
        let rendered = render("<div class=\"note\">trusted</div>\n\nAfter.\n");

        assert!(rendered.html.contains("<div class=\"note\">trusted</div>"));
    }

    #[test]
    fn test_render_gfm_table() {
        let rendered = render("| a | b |\n|---|---|\n| 1 | 2 |\n");

        assert!(rendered.html.contains("<table>"));
    }
}
