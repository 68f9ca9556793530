//! Quill CLI - file-backed publishing engine.
//!
//! Provides commands for:
//! - `list`: List published posts page by page (or every record with drafts)
//! - `show`: Show one post with its neighbours and related posts
//! - `tags`: List tags (and categories) with post counts
//! - `search`: Full-text search over published posts
//! - `new`: Create a new post skeleton
//! - `export`: Export the site as static HTML

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExportArgs, ListArgs, NewArgs, SearchArgs, ShowArgs, TagsArgs};
use output::Output;

/// Quill - file-backed publishing engine.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List published posts.
    List(ListArgs),
    /// Show a single post.
    Show(ShowArgs),
    /// List tags with post counts.
    Tags(TagsArgs),
    /// Search published posts.
    Search(SearchArgs),
    /// Create a new post.
    New(NewArgs),
    /// Export the site as static HTML.
    Export(ExportArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::List(args) => args.common.verbose,
            Self::Show(args) => args.common.verbose,
            Self::Tags(args) => args.common.verbose,
            Self::Search(args) => args.common.verbose,
            Self::New(args) => args.common.verbose,
            Self::Export(args) => args.common.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::List(args) => args.execute(),
        Commands::Show(args) => args.execute(),
        Commands::Tags(args) => args.execute(),
        Commands::Export(args) => args.execute(),
        Commands::Search(args) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(args.execute())
        }
        Commands::New(args) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(args.execute())
        }
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("quill").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_defaults_to_first_page() {
        let cli = parse(&["list"]);
        assert!(!cli.command.verbose());
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_verbose_flag_on_every_command() {
        for args in [
            &["list", "-v"][..],
            &["show", "tech", "intro", "--verbose"],
            &["tags", "-v"],
            &["search", "rust", "-v"],
            &["new", "Hello", "-v"],
            &["export", "--verbose"],
        ] {
            assert!(parse(args).command.verbose(), "{args:?}");
        }
    }

    #[test]
    fn test_search_requires_query() {
        let result = Cli::try_parse_from(["quill", "search"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_flag_is_shared() {
        let cli = parse(&["export", "--config", "site/quill.toml", "-o", "out"]);
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(
            args.common.config.as_deref(),
            Some(std::path::Path::new("site/quill.toml"))
        );
    }
}
