//! `quill list` command implementation.

use clap::Args;
use quill_config::CliSettings;

use super::{CommonArgs, open_store, summary_line};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Include drafts (lists every record, no pagination).
    #[arg(long)]
    drafts: bool,

    /// Page number, starting at 1.
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ListArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(CliSettings::default())?;
        let store = open_store(&config)?;

        if self.drafts {
            for doc in store.all_including_drafts() {
                output.line(&summary_line(&doc));
            }
            return Ok(());
        }

        let page = store.paginate(self.page, config.posts_per_page);
        if page.records.is_empty() {
            output.warning(&format!(
                "No posts on page {} (total pages: {})",
                page.current_page, page.total_pages
            ));
            return Ok(());
        }

        for doc in &page.records {
            let marker = if doc.pinned { "*" } else { " " };
            output.line(&format!("{marker} {}", summary_line(doc)));
        }
        output.muted(&format!("Page {} of {}", page.current_page, page.total_pages));
        Ok(())
    }
}
