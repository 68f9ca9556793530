//! `quill export` command implementation.

use std::path::PathBuf;

use clap::Args;
use quill_config::CliSettings;
use quill_export::{ExportConfig, MiniJinjaTemplates, StaticExporter};

use super::{CommonArgs, open_store};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Public base URL (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    /// Theme name (overrides config).
    #[arg(long)]
    theme: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ExportArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(CliSettings {
            output_dir: self.output_dir,
            base_url: self.base_url,
            theme: self.theme,
            ..CliSettings::default()
        })?;

        output.info(&format!(
            "Source: {}",
            config.content_resolved.blog_dir.display()
        ));
        output.info(&format!("Theme: {}", config.theme_dir().display()));
        output.info(&format!("Output: {}", config.output_dir.display()));

        let store = open_store(&config)?;
        let templates = MiniJinjaTemplates::from_dir(config.layouts_dir());
        let exporter = StaticExporter::new(ExportConfig::from_config(&config), templates);
        let stats = exporter.generate(&store)?;

        output.success(&format!(
            "Exported {} posts, {} pages, {} categories and {} tags in {:.0}ms",
            stats.posts, stats.pages, stats.categories, stats.tags, stats.elapsed_ms
        ));
        Ok(())
    }
}
