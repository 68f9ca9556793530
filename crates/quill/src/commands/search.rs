//! `quill search` command implementation.

use clap::Args;
use quill_config::CliSettings;
use quill_search::SearchIndex;

use super::{CommonArgs, open_store, summary_line};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the search command.
#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Search terms; any term may match.
    #[arg(required = true)]
    query: Vec<String>,

    /// Query the existing index instead of rebuilding it first.
    #[arg(long)]
    no_rebuild: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl SearchArgs {
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(CliSettings::default())?;
        let store = open_store(&config)?;
        let snapshot = store.snapshot();

        let index = SearchIndex::new(&config.search_index_path);
        if !self.no_rebuild {
            index.rebuild(&snapshot.all_including_drafts()).await?;
        }

        let query = self.query.join(" ");
        let hits = index.search(&query, &snapshot).await;
        if hits.is_empty() {
            output.warning(&format!("No results for \"{query}\""));
            return Ok(());
        }

        for doc in &hits {
            output.line(&summary_line(doc));
            output.muted(&format!("    {}", doc.summary));
        }
        Ok(())
    }
}
