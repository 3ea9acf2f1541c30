//! Error types for extlint.
//!
//! Module-level errors live next to the code that raises them and are
//! folded into [`ExtlintError`] through `#[from]` conversions.

use std::path::PathBuf;

use thiserror::Error;

use crate::analyzer::extlint::helm::HelmError;
use crate::analyzer::extlint::parser::extension::MetadataError;
use crate::analyzer::extlint::parser::manifest::ManifestError;
use crate::analyzer::extlint::values::ValuesError;

/// Top-level error for a lint run.
#[derive(Debug, Error)]
pub enum ExtlintError {
    #[error(transparent)]
    Values(#[from] ValuesError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Helm(#[from] HelmError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Walking a chart's `charts/` directory failed.
    #[error("failed to walk subcharts under {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A disabled-rule id that names no builtin rule.
    #[error("unknown rule: {0}")]
    UnknownRule(String),

    /// The generic lint pass found charts with hard errors.
    #[error("{linted} chart(s) linted, {failed} chart(s) failed")]
    ChartsFailed { linted: usize, failed: usize },
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParsingFailed(String),
}

pub type Result<T> = std::result::Result<T, ExtlintError>;
