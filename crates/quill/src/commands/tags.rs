//! `quill tags` command implementation.

use clap::Args;
use quill_config::CliSettings;

use super::{CommonArgs, open_store};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tags command.
#[derive(Args)]
pub(crate) struct TagsArgs {
    /// Also list categories.
    #[arg(long)]
    categories: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl TagsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(CliSettings::default())?;
        let store = open_store(&config)?;

        for tag in store.tags() {
            output.line(&format!("{:>4}  {}", tag.count, tag.name));
        }

        if self.categories {
            output.separator();
            for category in store.categories() {
                output.line(&format!("{:>4}  {}", category.count, category.name));
            }
        }
        Ok(())
    }
}
