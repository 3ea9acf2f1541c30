//! Chart.yaml model.
//!
//! Extensions do not ship a Chart.yaml of their own; one is generated from
//! `extension.yaml` before the chart is handed to Helm. This module holds
//! the standard chart metadata shape and its validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default chart API version for generated Chart.yaml files.
pub const DEFAULT_API_VERSION: &str = "v2";

/// Chart maintainer information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Maintainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Chart dependency.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(
        rename = "import-values",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub import_values: Vec<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Standard chart metadata, as written to Chart.yaml.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    pub api_version: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<Maintainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ChartMetadata {
    /// Validate the fields Helm refuses to load a chart without.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_version.is_empty() {
            return Err("chart.metadata.apiVersion is required".to_string());
        }
        if self.name.is_empty() {
            return Err("chart.metadata.name is required".to_string());
        }
        if self.name.contains('/') || self.name.contains('\\') || self.name == ".." {
            return Err(format!("chart.metadata.name {:?} is invalid", self.name));
        }
        if self.version.is_empty() {
            return Err("chart.metadata.version is required".to_string());
        }
        if semver::Version::parse(self.version.trim_start_matches('v')).is_err() {
            return Err(format!(
                "chart.metadata.version {:?} is invalid",
                self.version
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for dep in &self.dependencies {
            let name = dep.alias.as_deref().unwrap_or(&dep.name);
            if !seen.insert(name) {
                return Err(format!(
                    "more than one dependency with name or alias {:?}",
                    name
                ));
            }
        }

        Ok(())
    }

    /// Serialize to Chart.yaml content.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Parse Chart.yaml content.
pub fn parse_chart_yaml(content: &str) -> Result<ChartMetadata, serde_yaml::Error> {
    serde_yaml::from_str(content)
}
