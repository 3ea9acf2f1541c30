//! KS1002: `global.imageRegistry` reaches every container image.

use super::{FindingSink, Rule, RuleContext, for_each_object, random_token};
use crate::analyzer::extlint::helm::RenderedTemplates;
use crate::analyzer::extlint::types::{Finding, ResourceRef, Severity};
use crate::analyzer::extlint::values::ValueOptions;
use crate::error::Result;

const CODE: &str = "KS1002";

pub struct ImageRegistryRule;

impl Rule for ImageRegistryRule {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        "global-image-registry"
    }

    fn subject(&self) -> &'static str {
        "global.imageRegistry"
    }

    fn description(&self) -> &'static str {
        "Setting global.imageRegistry changes the image of every container and init container"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &RuleContext<'_>, sink: &mut FindingSink<'_>) -> Result<()> {
        let token = random_token();
        let values = ValueOptions {
            string_values: vec![format!("global.imageRegistry={}", token)],
            ..Default::default()
        }
        .merge_values()?;

        let files = ctx.engine.render(ctx.chart, &values)?;
        check_image_registry(&files, &token, ctx.extension, sink)
    }
}

/// Report every container of every workload whose image lacks `token`.
///
/// A container without an image counts as lacking it.
pub fn check_image_registry(
    files: &RenderedTemplates,
    token: &str,
    extension: &str,
    sink: &mut FindingSink<'_>,
) -> Result<()> {
    for_each_object(files, |file, object| {
        let Some(workload) = object.workload() else {
            return Ok(());
        };
        let Some(spec) = &workload.pod_spec else {
            return Ok(());
        };

        let groups = [
            ("init-container", &spec.init_containers),
            ("container", &spec.containers),
        ];
        for (label, containers) in groups {
            for container in containers {
                if container.image.as_deref().is_some_and(|i| i.contains(token)) {
                    continue;
                }
                let resource = ResourceRef {
                    kind: object.kind().to_string(),
                    name: workload.name.clone(),
                };
                let message = format!(
                    "global.imageRegistry doesn't work in {} {} of extension: {} file: {} Resource: {}",
                    label, container.name, extension, file, resource
                );
                sink(
                    Finding::error(CODE, message)
                        .with_file(file)
                        .with_resource(resource.kind, resource.name)
                        .with_container(&container.name),
                )?;
            }
        }
        Ok(())
    })
}
