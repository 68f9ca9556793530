//! CLI error types.

use quill_config::ConfigError;
use quill_content::ParseError;
use quill_export::ExportError;
use quill_search::IndexError;
use quill_store::StoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Index(#[from] IndexError),

    #[error("{0}")]
    Export(#[from] ExportError),
}
