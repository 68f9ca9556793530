//! `quill new` command implementation.

use clap::Args;
use quill_config::CliSettings;
use quill_search::SearchIndex;
use quill_store::NewDocument;

use super::{CommonArgs, open_store};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the new command.
#[derive(Args)]
pub(crate) struct NewArgs {
    /// Title of the new post.
    title: String,

    /// Category directory (default: top level).
    #[arg(long, default_value = "")]
    category: String,

    /// Slug (default: derived from the title).
    #[arg(long, default_value = "")]
    slug: String,

    /// Create the post as a draft.
    #[arg(long)]
    draft: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl NewArgs {
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(CliSettings::default())?;
        let store = open_store(&config)?;

        let path = store.create_document(&NewDocument {
            category: self.category,
            title: self.title,
            slug: self.slug,
            draft: self.draft,
        })?;

        // Keep the store and search index in step with the new file.
        store.reload()?;
        let index = SearchIndex::new(&config.search_index_path);
        index.rebuild(&store.all_including_drafts()).await?;

        output.success(&format!("Created {}", path.display()));
        Ok(())
    }
}
