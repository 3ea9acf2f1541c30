use std::io;
use std::path::PathBuf;

use colored::Colorize;
use log::{debug, info};

use crate::analyzer::extlint::helm::{HelmCli, ReleaseContext};
use crate::analyzer::extlint::rules::validate_rule_ids;
use crate::analyzer::extlint::{LintOptions, Report, ValueOptions, all_rules, lint};
use crate::cli::LintArgs;
use crate::config::types::Config;

/// Build lint options from command-line flags on top of the config.
///
/// Fails if a disabled rule names no builtin rule.
pub fn lint_options(args: &LintArgs, config: &Config) -> crate::Result<LintOptions> {
    let mut disabled_rules = config.checks.disabled.clone();
    for rule in &args.disabled_rules {
        if !disabled_rules.contains(rule) {
            disabled_rules.push(rule.clone());
        }
    }

    validate_rule_ids(&disabled_rules)?;

    Ok(LintOptions {
        namespace: args.namespace.clone(),
        quiet: args.quiet || config.lint.quiet,
        with_subcharts: args.with_subcharts || config.lint.with_subcharts,
        strict: args.strict || config.lint.strict,
        values: ValueOptions {
            value_files: args.value_files.clone(),
            values: args.values.clone(),
            string_values: args.string_values.clone(),
            json_values: args.json_values.clone(),
            file_values: args.file_values.clone(),
            literal_values: args.literal_values.clone(),
        },
        skip_helm: args.skip_helm,
        skip_builtins: args.skip_builtins,
        disabled_rules,
    })
}

/// Build the helm engine. `--helm-bin` wins over the config.
pub fn helm_engine(helm_bin: Option<PathBuf>, config: &Config) -> HelmCli {
    let binary = helm_bin.unwrap_or_else(|| PathBuf::from(&config.helm.binary));
    debug!("Using helm binary {}", binary.display());
    HelmCli::new(binary).with_release(ReleaseContext {
        name: config.helm.release_name.clone(),
        namespace: config.helm.namespace.clone(),
    })
}

pub fn handle_lint(args: LintArgs, helm_bin: Option<PathBuf>, config: &Config) -> crate::Result<()> {
    let options = lint_options(&args, config)?;
    let engine = helm_engine(helm_bin, config);
    if let Some(version) = engine.version() {
        info!("Using helm {}", version);
    }

    let mut report = Report::new(io::stdout().lock());
    let summary = lint(&args.paths, &options, &engine, &mut report)?;

    info!(
        "{} ({} with warnings or errors, {} rule finding(s))",
        summary.line(),
        summary.with_warnings_or_errors,
        report.findings().len()
    );
    Ok(())
}

pub fn handle_rules() -> crate::Result<()> {
    println!("{}", "Builtin extension rules:".bold());
    for rule in all_rules() {
        println!(
            "  {}  {:<24} {:<8} {}",
            rule.code().cyan(),
            rule.name(),
            rule.severity().as_str(),
            rule.description()
        );
    }
    Ok(())
}
