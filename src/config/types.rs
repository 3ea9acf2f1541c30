use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub helm: HelmConfig,
    pub lint: LintConfig,
    pub checks: ChecksConfig,
}

/// Chart engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    /// helm executable, looked up in PATH unless absolute
    pub binary: String,
    /// Release name used when rendering for rule checks
    pub release_name: String,
    /// Namespace used when rendering for rule checks
    pub namespace: String,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            binary: "helm".to_string(),
            release_name: "undefined".to_string(),
            namespace: "undefined".to_string(),
        }
    }
}

/// Defaults for `extlint lint` flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub quiet: bool,
    pub with_subcharts: bool,
    pub strict: bool,
}

/// Extension rule configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Rule codes or names to skip, e.g. "KS1003" or "global-node-selector"
    pub disabled: Vec<String>,
}
