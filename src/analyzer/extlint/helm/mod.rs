//! Chart engine integration.
//!
//! Loading, rendering and generic linting of charts is delegated to the
//! `helm` binary. The [`ChartEngine`] trait is the seam between the lint
//! pipeline and Helm, so the pipeline can run against a fake engine.

pub mod engine;
pub mod output;
pub mod render;
pub mod stage;

use std::path::PathBuf;

use thiserror::Error;

pub use engine::{ChartEngine, HelmCli, HelmLintOptions, ReleaseContext};
pub use output::{ChartLintResult, LintMessage, parse_lint_output};
pub use render::{RenderedTemplates, split_rendered_output};
pub use stage::{PreparedChart, prepare_chart};

/// Chart engine errors.
#[derive(Debug, Error)]
pub enum HelmError {
    #[error("helm binary not found: {0}")]
    HelmNotFound(PathBuf),

    #[error("failed to run helm: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to render chart {chart}: {message}")]
    Render { chart: PathBuf, message: String },

    #[error("failed to write values file: {0}")]
    ValuesFile(#[source] std::io::Error),

    #[error("failed to serialize values: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
