//! CLI command implementations.

use std::path::PathBuf;

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_content::Document;
use quill_store::{ContentStore, StoreConfig};

use crate::error::CliError;

pub(crate) mod export;
pub(crate) mod list;
pub(crate) mod new;
pub(crate) mod search;
pub(crate) mod show;
pub(crate) mod tags;

pub(crate) use export::ExportArgs;
pub(crate) use list::ListArgs;
pub(crate) use new::NewArgs;
pub(crate) use search::SearchArgs;
pub(crate) use show::ShowArgs;
pub(crate) use tags::TagsArgs;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Blog content directory (overrides config).
    #[arg(long, env = "QUILL_BLOG_DIR")]
    pub blog_dir: Option<PathBuf>,

    /// Enable verbose output (reload and timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load configuration, applying `settings` on top of the shared overrides.
    pub(crate) fn load_config(&self, settings: CliSettings) -> Result<Config, CliError> {
        let settings = CliSettings {
            blog_dir: self.blog_dir.clone(),
            ..settings
        };
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}

/// Create a store for `config` and load it from disk.
pub(crate) fn open_store(config: &Config) -> Result<ContentStore, CliError> {
    let store = ContentStore::new(StoreConfig {
        content_dir: config.content_resolved.blog_dir.clone(),
        pages_dir: config.content_resolved.pages_dir.clone(),
    });
    let stats = store.reload()?;
    tracing::debug!(
        documents = stats.documents,
        skipped = stats.skipped,
        "Store opened"
    );
    Ok(store)
}

/// One-line listing of a record: date, key, title and draft marker.
pub(crate) fn summary_line(doc: &Document) -> String {
    let date = doc
        .date
        .map_or_else(|| "----------".to_owned(), |d| d.format("%Y-%m-%d").to_string());
    let draft = if doc.draft { " [draft]" } else { "" };
    format!("{date}  {}/{}  {}{draft}", doc.category, doc.slug, doc.title)
}
