//! Word count and reading time.

use std::sync::LazyLock;

use regex::Regex;

use crate::text::plain_text;

static LATIN_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-Z]+").unwrap());

const CJK_PER_MINUTE: f64 = 300.0;
const WORDS_PER_MINUTE: f64 = 200.0;

/// Word statistics for a rendered document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextStats {
    /// CJK ideographs plus Latin words.
    pub word_count: usize,
    /// Estimated reading time in minutes, at least 1.
    pub reading_time: u32,
}

/// Compute word count and reading time from rendered HTML.
///
/// CJK ideographs (U+4E00..=U+9FFF) count one each; each run of ASCII
/// letters counts as one word. Reading time is
/// `ceil(cjk / 300 + words / 200)` minutes with a floor of one minute.
#[must_use]
pub fn text_stats(html: &str) -> TextStats {
    let text = plain_text(html);

    let cjk = text
        .chars()
        .filter(|c| ('\u{4e00}'..='\u{9fff}').contains(c))
        .count();
    let words = LATIN_WORD_RE.find_iter(&text).count();

    #[allow(clippy::cast_precision_loss)]
    let minutes = cjk as f64 / CJK_PER_MINUTE + words as f64 / WORDS_PER_MINUTE;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let reading_time = (minutes.ceil() as u32).max(1);

    TextStats {
        word_count: cjk + words,
        reading_time,
    }
}
