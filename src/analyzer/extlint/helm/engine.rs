//! The chart engine seam and its `helm` binary implementation.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use once_cell::sync::OnceCell;
use serde_yaml::Value;
use tempfile::NamedTempFile;

use super::HelmError;
use super::output::{ChartLintResult, parse_lint_output};
use super::render::{RenderedTemplates, split_rendered_output};
use crate::common::command_utils::{execute_command, is_command_available};

/// Release identity used when rendering for rule checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseContext {
    pub name: String,
    pub namespace: String,
}

impl Default for ReleaseContext {
    fn default() -> Self {
        Self {
            name: "undefined".to_string(),
            namespace: "undefined".to_string(),
        }
    }
}

/// Options for the generic lint pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmLintOptions {
    pub namespace: String,
    /// Treat warnings as hard errors.
    pub strict: bool,
}

impl Default for HelmLintOptions {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            strict: false,
        }
    }
}

/// Loads, renders and lints charts.
pub trait ChartEngine {
    /// Render every template of `chart` with `values` merged over the
    /// chart defaults.
    fn render(&self, chart: &Path, values: &Value) -> Result<RenderedTemplates, HelmError>;

    /// Run the standard lint pass over `chart`.
    fn lint(
        &self,
        chart: &Path,
        values: &Value,
        options: &HelmLintOptions,
    ) -> Result<ChartLintResult, HelmError>;
}

/// [`ChartEngine`] backed by the `helm` command line.
#[derive(Debug)]
pub struct HelmCli {
    binary: PathBuf,
    release: ReleaseContext,
    available: OnceCell<bool>,
}

impl Default for HelmCli {
    fn default() -> Self {
        Self::new("helm")
    }
}

impl HelmCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            release: ReleaseContext::default(),
            available: OnceCell::new(),
        }
    }

    pub fn with_release(mut self, release: ReleaseContext) -> Self {
        self.release = release;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Check if the helm binary can be run. The probe runs once.
    pub fn is_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| is_command_available(&self.binary, ["version", "--short"]))
    }

    /// Get the helm version, if available.
    pub fn version(&self) -> Option<String> {
        execute_command(&self.binary, ["version", "--short"])
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
    }

    fn ensure_available(&self) -> Result<(), HelmError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(HelmError::HelmNotFound(self.binary.clone()))
        }
    }
}

impl ChartEngine for HelmCli {
    fn render(&self, chart: &Path, values: &Value) -> Result<RenderedTemplates, HelmError> {
        self.ensure_available()?;
        let values_file = write_values_file(values)?;

        let args: Vec<OsString> = vec![
            "template".into(),
            self.release.name.clone().into(),
            chart.into(),
            "--namespace".into(),
            self.release.namespace.clone().into(),
            "-f".into(),
            values_file.path().into(),
        ];
        let output = execute_command(&self.binary, &args).map_err(HelmError::Spawn)?;

        if !output.status.success() {
            return Err(HelmError::Render {
                chart: chart.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let rendered = split_rendered_output(&String::from_utf8_lossy(&output.stdout));
        debug!("Rendered {} template file(s) from {}", rendered.len(), chart.display());
        Ok(rendered)
    }

    fn lint(
        &self,
        chart: &Path,
        values: &Value,
        options: &HelmLintOptions,
    ) -> Result<ChartLintResult, HelmError> {
        self.ensure_available()?;
        let values_file = write_values_file(values)?;

        let mut args: Vec<OsString> = vec![
            "lint".into(),
            chart.into(),
            "--namespace".into(),
            options.namespace.clone().into(),
        ];
        if options.strict {
            args.push("--strict".into());
        }
        args.push("-f".into());
        args.push(values_file.path().into());

        let output = execute_command(&self.binary, &args).map_err(HelmError::Spawn)?;

        Ok(parse_lint_output(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
            output.status.success(),
            options.strict,
        ))
    }
}

fn write_values_file(values: &Value) -> Result<NamedTempFile, HelmError> {
    let content = match values {
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)?,
    };

    let mut file = tempfile::Builder::new()
        .prefix("extlint-values-")
        .suffix(".yaml")
        .tempfile()
        .map_err(HelmError::ValuesFile)?;
    file.write_all(content.as_bytes())
        .map_err(HelmError::ValuesFile)?;
    file.flush().map_err(HelmError::ValuesFile)?;
    Ok(file)
}
