//! Extlint: linting for extension charts.
//!
//! Runs Helm's own lint checks over each chart and then checks the
//! conventions extensions must follow on top of them.

pub mod discover;
pub mod helm;
pub mod lint;
pub mod parser;
pub mod report;
pub mod rules;
pub mod types;
pub mod values;

pub use discover::discover_charts;
pub use helm::{ChartEngine, ChartLintResult, HelmCli, LintMessage, RenderedTemplates};
pub use lint::{LintOptions, LintSummary, lint, lint_with_builtins, lint_with_helm};
pub use report::Report;
pub use rules::{FindingSink, Rule, all_rules};
pub use types::{Finding, ResourceRef, Severity};
pub use values::ValueOptions;
