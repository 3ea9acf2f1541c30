//! Lint orchestration: the generic helm pass, then the extension rules.

use std::io::Write;
use std::path::PathBuf;

use log::{debug, info};

use crate::analyzer::extlint::discover::discover_charts;
use crate::analyzer::extlint::helm::{ChartEngine, HelmLintOptions, prepare_chart};
use crate::analyzer::extlint::parser::extension::MetadataError;
use crate::analyzer::extlint::report::Report;
use crate::analyzer::extlint::rules::{RuleContext, run_rules};
use crate::analyzer::extlint::types::Severity;
use crate::analyzer::extlint::values::ValueOptions;
use crate::error::{ExtlintError, Result};

/// Options for a lint run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOptions {
    /// Namespace for the generic lint pass.
    pub namespace: String,
    /// Hide clean charts and info messages.
    pub quiet: bool,
    /// Also lint charts found under each root's `charts/` directory.
    pub with_subcharts: bool,
    /// Treat warnings as hard errors.
    pub strict: bool,
    pub values: ValueOptions,
    pub skip_helm: bool,
    pub skip_builtins: bool,
    /// Rule codes or names to skip.
    pub disabled_rules: Vec<String>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            quiet: false,
            with_subcharts: false,
            strict: false,
            values: ValueOptions::default(),
            skip_helm: false,
            skip_builtins: false,
            disabled_rules: Vec::new(),
        }
    }
}

/// Tally of the generic lint pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintSummary {
    pub linted: usize,
    pub failed: usize,
    /// Charts with at least one warning or error.
    pub with_warnings_or_errors: usize,
}

impl LintSummary {
    pub fn line(&self) -> String {
        format!(
            "{} chart(s) linted, {} chart(s) failed",
            self.linted, self.failed
        )
    }
}

/// Run the generic helm pass, then the extension rules.
pub fn lint<W: Write>(
    paths: &[PathBuf],
    options: &LintOptions,
    engine: &dyn ChartEngine,
    report: &mut Report<W>,
) -> Result<LintSummary> {
    let summary = if options.skip_helm {
        debug!("Skipping helm lint");
        LintSummary::default()
    } else {
        lint_with_helm(paths, options, engine, report)?
    };

    if options.skip_builtins {
        debug!("Skipping builtin rules");
    } else {
        lint_with_builtins(paths, options, engine, report)?;
    }

    Ok(summary)
}

/// Run the engine's standard lint pass over every chart.
///
/// Fails with [`ExtlintError::ChartsFailed`] when any chart has hard errors.
pub fn lint_with_helm<W: Write>(
    paths: &[PathBuf],
    options: &LintOptions,
    engine: &dyn ChartEngine,
    report: &mut Report<W>,
) -> Result<LintSummary> {
    report.banner("lint by helm")?;

    let charts = discover_charts(paths, options.with_subcharts)?;
    let values = options.values.merge_values()?;
    let helm_options = HelmLintOptions {
        namespace: options.namespace.clone(),
        strict: options.strict,
    };

    let mut summary = LintSummary {
        linted: charts.len(),
        ..Default::default()
    };

    for chart in &charts {
        let prepared = prepare_chart(chart)?;
        info!("Linting {}", chart.display());
        let result = engine.lint(prepared.path(), &values, &helm_options)?;

        let has_warnings_or_errors = result.has_warnings_or_errors();
        if has_warnings_or_errors {
            summary.with_warnings_or_errors += 1;
        }
        if options.quiet && !has_warnings_or_errors {
            continue;
        }

        report.buffer_line(format!("==> Linting {}", chart.display()));

        // Messages already include the errors when there are any.
        if result.messages.is_empty() {
            for err in &result.errors {
                report.buffer_line(format!("Error {}", err));
            }
        }

        for msg in &result.messages {
            if !options.quiet || msg.severity > Severity::Info {
                report.buffer_line(msg.to_string());
            }
        }

        if result.failed() {
            summary.failed += 1;
        }

        report.buffer_line("");
    }

    report.flush_buffer()?;

    if summary.failed > 0 {
        return Err(ExtlintError::ChartsFailed {
            linted: summary.linted,
            failed: summary.failed,
        });
    }
    if !options.quiet || summary.with_warnings_or_errors > 0 {
        report.summary(&summary.line())?;
    }

    Ok(summary)
}

/// Run the extension rules against every root path.
///
/// Discovered subcharts are never checked. Each root must be an extension.
pub fn lint_with_builtins<W: Write>(
    paths: &[PathBuf],
    options: &LintOptions,
    engine: &dyn ChartEngine,
    report: &mut Report<W>,
) -> Result<()> {
    report.banner("lint by builtin rules")?;

    for path in paths {
        let prepared = prepare_chart(path)?;
        let extension = prepared
            .extension()
            .ok_or_else(|| MetadataError::NotAnExtension(path.clone()))?;

        let name = path.display().to_string();
        let ctx = RuleContext {
            extension: &name,
            chart: prepared.path(),
            images: &extension.images,
            engine,
        };
        run_rules(&ctx, &options.disabled_rules, report)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let summary = LintSummary {
            linted: 2,
            failed: 1,
            with_warnings_or_errors: 1,
        };
        assert_eq!(summary.line(), "2 chart(s) linted, 1 chart(s) failed");
    }

    #[test]
    fn test_charts_failed_message_matches_summary() {
        let err = ExtlintError::ChartsFailed { linted: 2, failed: 1 };
        assert_eq!(err.to_string(), "2 chart(s) linted, 1 chart(s) failed");
    }

    #[test]
    fn test_default_options() {
        let options = LintOptions::default();
        assert_eq!(options.namespace, "default");
        assert!(!options.quiet);
        assert!(options.values.is_empty());
    }
}
