//! Table of contents generation.
//!
//! Level-2 and level-3 headings in the rendered HTML are numbered in document
//! order with a single counter shared by both levels, and each heading tag is
//! rewritten to carry its anchor id:
//!
//! ```text
//! <h2>Intro</h2>      ->  <h2 id="heading-1">Intro</h2>
//! <h3>Details</h3>    ->  <h3 id="heading-2">Details</h3>
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::text::plain_text;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h([23])>(.*?)</h([23])>").unwrap());

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading level (2 or 3).
    pub level: u8,
    /// Anchor id (`heading-<n>`).
    pub id: String,
    /// Heading text with markup removed.
    pub title: String,
}

/// Collect level-2/3 headings and add anchor ids to them.
///
/// Returns the rewritten HTML and the entries in document order. Inner
/// heading markup is kept as-is; only the opening tag changes.
#[must_use]
pub fn build_toc(html: &str) -> (String, Vec<TocEntry>) {
    let mut entries = Vec::new();

    let rewritten = HEADING_RE.replace_all(html, |caps: &Captures<'_>| {
        let (open, inner, close) = (&caps[1], &caps[2], &caps[3]);
        // Mismatched pairs like <h2>..</h3> are not headings we produced
        if open != close {
            return caps[0].to_owned();
        }

        let id = format!("heading-{}", entries.len() + 1);
        entries.push(TocEntry {
            level: if open == "2" { 2 } else { 3 },
            id: id.clone(),
            title: plain_text(inner).trim().to_owned(),
        });
        format!("<h{open} id=\"{id}\">{inner}</h{open}>")
    });

    (rewritten.into_owned(), entries)
}
