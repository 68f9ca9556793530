//! `quill show` command implementation.

use clap::Args;
use quill_cache::RenderCache;
use quill_config::CliSettings;
use quill_store::StoreError;

use super::{CommonArgs, open_store, summary_line};
use crate::error::CliError;
use crate::output::Output;

/// Number of related posts listed.
const RELATED_LIMIT: usize = 3;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Category of the post (`uncategorized` for top-level files).
    category: String,

    /// Slug of the post.
    slug: String,

    /// Print the rendered HTML body.
    #[arg(long)]
    body: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ShowArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(CliSettings::default())?;
        let store = open_store(&config)?;

        let doc = store.lookup(&self.category, &self.slug)?;

        output.highlight(&doc.title);
        output.line(&summary_line(&doc));
        if !doc.tags.is_empty() {
            output.line(&format!("Tags: {}", doc.tags.join(", ")));
        }
        output.line(&format!(
            "{} words, {} min read",
            doc.word_count, doc.reading_time
        ));

        if !doc.toc.is_empty() {
            output.separator();
            for entry in &doc.toc {
                let indent = if entry.level == 3 { "    " } else { "  " };
                output.line(&format!("{indent}{} (#{})", entry.title, entry.id));
            }
        }

        output.separator();
        match store.adjacent(&doc) {
            Ok(adjacent) => {
                if let Some(newer) = &adjacent.newer {
                    output.line(&format!("Newer: {}", summary_line(newer)));
                }
                if let Some(older) = &adjacent.older {
                    output.line(&format!("Older: {}", summary_line(older)));
                }
            }
            Err(StoreError::NotFound(_)) => output.muted("Not in the published sequence"),
            Err(e) => return Err(e.into()),
        }
        for related in store.related(&doc, RELATED_LIMIT) {
            output.line(&format!("Related: {}", summary_line(&related)));
        }

        if self.body {
            let cache = RenderCache::new(store.parser().clone());
            output.separator();
            output.line(&cache.get(&doc)?);
        }
        Ok(())
    }
}
