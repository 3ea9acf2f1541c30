//! Extension rules.
//!
//! Each rule renders the chart on its own, with an override it controls,
//! and checks that the rendered manifests honour it. Findings go to a
//! [`FindingSink`] as soon as they are found, so a later decode failure
//! does not hide them.
//!
//! # Rules
//!
//! | Code | Name | Checks |
//! |------|------|--------|
//! | KS1001 | images | declared images appear in the rendered templates |
//! | KS1002 | global-image-registry | `global.imageRegistry` reaches every container image |
//! | KS1003 | global-node-selector | `global.nodeSelector` reaches every pod template |

pub mod image_registry;
pub mod images;
pub mod node_selector;

use std::io::{self, Write};
use std::path::Path;

use log::{debug, info};
use rand::Rng;

use crate::analyzer::extlint::helm::{ChartEngine, RenderedTemplates};
use crate::analyzer::extlint::parser::manifest::{K8sObject, decode_documents};
use crate::analyzer::extlint::report::Report;
use crate::analyzer::extlint::types::{Finding, Severity};
use crate::error::{ExtlintError, Result};

pub use image_registry::ImageRegistryRule;
pub use images::ImagesRule;
pub use node_selector::NodeSelectorRule;

/// Alphabet of generated override tokens. No vowels, no look-alikes.
pub const TOKEN_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

/// Length of generated override tokens.
pub const TOKEN_LEN: usize = 12;

/// Receives findings one at a time.
pub type FindingSink<'a> = dyn FnMut(Finding) -> io::Result<()> + 'a;

/// Everything a rule needs to check one extension.
pub struct RuleContext<'a> {
    /// Extension path as given by the user, used in messages.
    pub extension: &'a str,
    /// Chart path the engine loads.
    pub chart: &'a Path,
    /// Images declared in extension.yaml.
    pub images: &'a [String],
    pub engine: &'a dyn ChartEngine,
}

/// An extension rule.
pub trait Rule {
    /// Get the rule code (e.g., "KS1002").
    fn code(&self) -> &'static str;

    /// Get the rule name (e.g., "global-image-registry").
    fn name(&self) -> &'static str;

    /// What the rule lints, as printed in its section header.
    fn subject(&self) -> &'static str;

    /// Get the rule description.
    fn description(&self) -> &'static str;

    /// Get the severity of the findings it reports.
    fn severity(&self) -> Severity;

    /// Render the chart and check it, passing each finding to `sink`.
    fn check(&self, ctx: &RuleContext<'_>, sink: &mut FindingSink<'_>) -> Result<()>;

    /// Check if `id` names this rule, by code or name.
    fn matches(&self, id: &str) -> bool {
        id.eq_ignore_ascii_case(self.code()) || id == self.name()
    }
}

/// Get all rules, in the order they run.
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ImagesRule),
        Box::new(ImageRegistryRule),
        Box::new(NodeSelectorRule),
    ]
}

/// Get a rule by code or name.
pub fn get_rule(id: &str) -> Option<Box<dyn Rule>> {
    all_rules().into_iter().find(|r| r.matches(id))
}

/// Check that every id names a rule.
pub fn validate_rule_ids(ids: &[String]) -> Result<()> {
    match ids.iter().find(|id| get_rule(id).is_none()) {
        Some(id) => Err(ExtlintError::UnknownRule(id.clone())),
        None => Ok(()),
    }
}

/// Run every enabled rule against one extension.
///
/// Findings are written as they are found. A rule that fails to render or
/// decode aborts the run, after everything it found up to that point.
pub fn run_rules<W: Write>(
    ctx: &RuleContext<'_>,
    disabled: &[String],
    report: &mut Report<W>,
) -> Result<()> {
    for rule in all_rules() {
        if disabled.iter().any(|id| rule.matches(id)) {
            debug!("Skipping disabled rule {} ({})", rule.code(), rule.name());
            continue;
        }

        report.section(rule.subject())?;
        let mut found = 0;
        rule.check(ctx, &mut |finding| {
            found += 1;
            report.emit(finding)
        })?;
        info!("{} found {} issue(s) in {}", rule.code(), found, ctx.extension);
    }
    Ok(())
}

/// Generate a random override token.
pub fn random_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Visit every object of every YAML file, with its file name, in order.
///
/// Stops at the first document that fails to decode.
pub fn for_each_object(
    files: &RenderedTemplates,
    mut visit: impl FnMut(&str, &K8sObject) -> Result<()>,
) -> Result<()> {
    for (name, content) in files.yaml_files() {
        for object in decode_documents(content, name) {
            visit(name, &object?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::path::Path;

    use serde_yaml::Value;

    use super::FindingSink;
    use crate::analyzer::extlint::helm::{
        ChartEngine, ChartLintResult, HelmError, HelmLintOptions, RenderedTemplates,
    };
    use crate::analyzer::extlint::types::Finding;

    /// Run `check` with a sink that keeps every finding.
    pub fn collect_findings(
        check: impl FnOnce(&mut FindingSink<'_>) -> crate::Result<()>,
    ) -> crate::Result<Vec<Finding>> {
        let mut findings = Vec::new();
        check(&mut |finding| {
            findings.push(finding);
            Ok(())
        })?;
        Ok(findings)
    }

    /// Engine that renders fixed templates and records the values it saw.
    pub struct StaticEngine {
        pub templates: RenderedTemplates,
        pub seen: RefCell<Vec<Value>>,
    }

    impl StaticEngine {
        pub fn new(templates: RenderedTemplates) -> Self {
            Self {
                templates,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChartEngine for StaticEngine {
        fn render(&self, _chart: &Path, values: &Value) -> Result<RenderedTemplates, HelmError> {
            self.seen.borrow_mut().push(values.clone());
            Ok(self.templates.clone())
        }

        fn lint(
            &self,
            _chart: &Path,
            _values: &Value,
            _options: &HelmLintOptions,
        ) -> Result<ChartLintResult, HelmError> {
            Ok(ChartLintResult::default())
        }
    }
}
