//! Command-line interface for viewdigest.
//!
//! # Commands
//!
//! - `digest` - Print the digest of a template and everything it renders
//! - `dependencies` - Print a template's direct dependencies as JSON
//! - `nested-dependencies` - Print the full dependency tree (JSON or tree view)
//!
//! # Global Options
//!
//! - `--config <FILE>` - Configuration file (default `./viewdigest.toml`)
//! - `--view-path <DIR>` - Template root, repeatable, searched after configured ones
//! - `--verbose` / `--quiet` - Log verbosity
//!
//! # Examples
//!
//! ```bash
//! viewdigest --view-path app/views digest articles/show
//! viewdigest --view-path app/views digest articles/show --dependency v2 --dependency en
//! viewdigest dependencies articles/show
//! viewdigest nested-dependencies articles/show --format tree
//! ```

mod common;
mod dependencies;
mod digest;


pub use common::CommandContext;
pub use dependencies::{DependenciesCommand, NestedDependenciesCommand, OutputFormat};
pub use digest::DigestCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::DigestConfig;

/// Default log filter when nothing else is configured.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(
    name = "viewdigest",
    about = "Compute cache digests for templates and their render dependencies",
    version,
    long_about = "viewdigest walks the templates a view renders, following render calls and \
                  explicit dependency declarations, and prints a digest that changes whenever \
                  any template in that tree changes."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output, including every template digested
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    ///
    /// Defaults to `$VIEWDIGEST_CONFIG` or `./viewdigest.toml`. An explicitly
    /// given file must exist.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Template root to search (repeatable)
    ///
    /// Searched after the view paths of the configuration file, in the order
    /// given.
    #[arg(long = "view-path", global = true, value_name = "DIR")]
    view_paths: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the digest of a template
    Digest(DigestCommand),

    /// Print the direct dependencies of a template as JSON
    Dependencies(DependenciesCommand),

    /// Print the full dependency tree of a template
    NestedDependencies(NestedDependenciesCommand),
}

impl Cli {
    /// Load configuration, set up logging, and run the selected command.
    pub async fn execute(self) -> Result<()> {
        let mut config = DigestConfig::load_with_optional(self.config.clone()).await?;
        init_logging(&self.log_filter(&config));
        config.merge_view_paths(self.view_paths.iter().cloned());

        let context = CommandContext::new(config);
        let output = match &self.command {
            Commands::Digest(cmd) => cmd.run(&context)?,
            Commands::Dependencies(cmd) => cmd.run(&context)?,
            Commands::NestedDependencies(cmd) => cmd.run(&context)?,
        };
        println!("{output}");
        Ok(())
    }

    /// Log filter from the flags, `RUST_LOG`, or the configuration, in that order.
    fn log_filter(&self, config: &DigestConfig) -> String {
        if self.verbose {
            "debug".to_string()
        } else if self.quiet {
            "error".to_string()
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            filter
        } else {
            config.log_level.clone().unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
        }
    }
}

/// Install the stderr log subscriber. Later calls are no-ops.
fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
