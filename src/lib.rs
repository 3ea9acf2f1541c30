//! # extlint
//!
//! A command-line linter for extension charts: Helm charts described by an
//! `extension.yaml` instead of a `Chart.yaml`.
//!
//! ## Features
//!
//! - **Helm lint**: runs Helm's standard lint pass over each chart and its subcharts
//! - **Image check**: every image declared in `extension.yaml` is used by the templates
//! - **Override checks**: `global.imageRegistry` and `global.nodeSelector` reach every workload
//! - **Helm value flags**: `-f`, `--set`, `--set-string`, `--set-json`, `--set-file`, `--set-literal`
//!
//! ## Example
//!
//! ```rust,no_run
//! use extlint_cli::analyzer::extlint::{HelmCli, LintOptions, Report, lint};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = HelmCli::default();
//! let mut report = Report::new(std::io::stdout());
//! lint(&[PathBuf::from("./my-extension")], &LintOptions::default(), &engine, &mut report)?;
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod handlers;

// Re-export commonly used types and functions
pub use error::{ExtlintError, Result};
pub use handlers::*;
use cli::{Cli, Commands};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_command(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Lint(args) => handlers::handle_lint(args, cli.helm_bin, &config),
        Commands::Rules => handlers::handle_rules(),
    }
}
