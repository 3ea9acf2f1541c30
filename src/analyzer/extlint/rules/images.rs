//! KS1001: declared images appear in the rendered templates.

use serde_yaml::{Mapping, Value};

use super::{FindingSink, Rule, RuleContext};
use crate::analyzer::extlint::helm::RenderedTemplates;
use crate::analyzer::extlint::types::{Finding, Severity};
use crate::error::Result;

const CODE: &str = "KS1001";

pub struct ImagesRule;

impl Rule for ImagesRule {
    fn code(&self) -> &'static str {
        CODE
    }

    fn name(&self) -> &'static str {
        "images"
    }

    fn subject(&self) -> &'static str {
        "images"
    }

    fn description(&self) -> &'static str {
        "Every image declared in extension.yaml is used by the rendered templates"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &RuleContext<'_>, sink: &mut FindingSink<'_>) -> Result<()> {
        if ctx.images.is_empty() {
            sink(Finding::warning(
                CODE,
                format!("extension {} has no images", ctx.extension),
            ))?;
            return Ok(());
        }

        let files = ctx
            .engine
            .render(ctx.chart, &Value::Mapping(Mapping::new()))?;

        for image in missing_images(&files, ctx.images) {
            sink(Finding::warning(
                CODE,
                format!("image {} was not found in the rendered templates", image),
            ))?;
        }
        Ok(())
    }
}

/// Declared images that no rendered YAML file mentions, in declaration order.
pub fn missing_images<'a>(files: &RenderedTemplates, images: &'a [String]) -> Vec<&'a str> {
    images
        .iter()
        .filter(|image| {
            !files
                .yaml_files()
                .any(|(_, content)| content.contains(image.as_str()))
        })
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::extlint::rules::testing::{StaticEngine, collect_findings};
    use std::path::Path;

    fn rendered() -> RenderedTemplates {
        [
            (
                "demo/templates/deployment.yaml",
                "spec:\n  containers:\n    - image: docker.io/demo/api:v1\n",
            ),
            ("demo/templates/NOTES.txt", "uses docker.io/demo/web:v1"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_missing_images() {
        let images = vec![
            "docker.io/demo/api:v1".to_string(),
            "docker.io/demo/web:v1".to_string(),
        ];
        // Only YAML files count.
        assert_eq!(missing_images(&rendered(), &images), vec!["docker.io/demo/web:v1"]);
    }

    #[test]
    fn test_no_images_skips_render() {
        let engine = StaticEngine::new(rendered());
        let ctx = RuleContext {
            extension: "ext/demo",
            chart: Path::new("ext/demo"),
            images: &[],
            engine: &engine,
        };

        let findings = collect_findings(|sink| ImagesRule.check(&ctx, sink)).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].to_string(), "WARNING: extension ext/demo has no images");
        assert!(engine.seen.borrow().is_empty());
    }

    #[test]
    fn test_renders_with_empty_overrides() {
        let engine = StaticEngine::new(rendered());
        let images = vec!["docker.io/demo/api:v1".to_string(), "busybox".to_string()];
        let ctx = RuleContext {
            extension: "demo",
            chart: Path::new("demo"),
            images: &images,
            engine: &engine,
        };

        let findings = collect_findings(|sink| ImagesRule.check(&ctx, sink)).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0].message.contains("busybox"));
        assert_eq!(engine.seen.borrow().as_slice(), &[Value::Mapping(Mapping::new())]);
    }
}
