//! Plain-text extraction and summaries.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Maximum summary length in Unicode code points (ellipsis excluded).
pub const SUMMARY_LENGTH: usize = 120;

/// Strip HTML tags and decode the entities the renderer emits.
///
/// Whitespace is left as-is; see [`summarize`] for the collapsed form.
///
/// # Examples
///
/// ```
/// use quill_content::plain_text;
///
/// assert_eq!(plain_text("<p>Fish &amp; chips</p>"), "Fish & chips");
/// ```
#[must_use]
pub fn plain_text(html: &str) -> String {
    decode_entities(&TAG_RE.replace_all(html, ""))
}

/// Build a summary from rendered HTML.
///
/// Tags are removed, whitespace runs collapse to a single space, and the
/// result is trimmed. Text longer than [`SUMMARY_LENGTH`] code points is cut
/// and gets a `...` suffix; shorter text is returned unchanged.
#[must_use]
pub fn summarize(html: &str) -> String {
    let text = plain_text(html);
    let text = WHITESPACE_RE.replace_all(&text, " ");
    truncate(text.trim(), SUMMARY_LENGTH)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_owned(),
    }
}

/// Decode the basic entities produced by HTML escaping.
///
/// `&amp;` is handled last so `&amp;lt;` decodes to `&lt;`, not `<`.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}
