//! KS1003: `global.nodeSelector` reaches every pod template.

use super::{FindingSink, Rule, RuleContext, for_each_object, random_token};
use crate::analyzer::extlint::helm::RenderedTemplates;
use crate::analyzer::extlint::parser::manifest::K8sObject;
use crate::analyzer::extlint::types::{Finding, ResourceRef, Severity};
use crate::analyzer::extlint::values::ValueOptions;
use crate::error::Result;

const CODE: &str = "KS1003";

/// Selector key the override sets.
pub const OS_LABEL: &str = "kubernetes.io/os";

pub struct NodeSelectorRule;

impl Rule for NodeSelectorRule {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        "global-node-selector"
    }

    fn subject(&self) -> &'static str {
        "global.nodeSelector"
    }

    fn description(&self) -> &'static str {
        "Setting global.nodeSelector reaches the pod template of every workload except DaemonSets"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>, sink: &mut FindingSink<'_>) -> Result<()> {
        let token = random_token();
        let values = ValueOptions {
            json_values: vec![format!(
                "global.nodeSelector={{\"{}\": \"{}\"}}",
                OS_LABEL, token
            )],
            ..Default::default()
        }
        .merge_values()?;

        let files = ctx.engine.render(ctx.chart, &values)?;
        check_node_selector(&files, &token, ctx.extension, sink)
    }
}

/// Report every workload whose node selector does not carry `token`.
///
/// DaemonSets are not checked.
pub fn check_node_selector(
    files: &RenderedTemplates,
    token: &str,
    extension: &str,
    sink: &mut FindingSink<'_>,
) -> Result<()> {
    for_each_object(files, |file, object| {
        if matches!(object, K8sObject::DaemonSet(_)) {
            return Ok(());
        }
        let Some(workload) = object.workload() else {
            return Ok(());
        };

        let propagated = workload
            .pod_spec
            .as_ref()
            .and_then(|spec| spec.node_selector.as_ref())
            .and_then(|selector| selector.get(OS_LABEL))
            .is_some_and(|value| value == token);
        if propagated {
            return Ok(());
        }

        let resource = ResourceRef {
            kind: object.kind().to_string(),
            name: workload.name.clone(),
        };
        let message = format!(
            "global.nodeSelector doesn't work in extension: {} file: {} Resource: {}",
            extension, file, resource
        );
        sink(
            Finding::error(CODE, message)
                .with_file(file)
                .with_resource(resource.kind, resource.name),
        )?;
        Ok(())
    })
}
