//! extension.yaml parser.
//!
//! An extension is a chart directory described by `extension.yaml`
//! instead of Chart.yaml. Besides the usual chart fields it carries
//! localized display text and the list of container images the
//! extension ships.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analyzer::extlint::parser::chart::{
    ChartMetadata, DEFAULT_API_VERSION, Dependency, Maintainer,
};

/// File name of the extension descriptor.
pub const METADATA_FILE: &str = "extension.yaml";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("no {METADATA_FILE} or Chart.yaml found in {0}")]
    NotFound(PathBuf),

    #[error("{0} is not an extension: no {METADATA_FILE} found")]
    NotAnExtension(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid icon {icon}: {reason}")]
    Icon { icon: String, reason: String },

    #[error("invalid metadata in {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Text that is either a plain string or keyed by locale (`en`, `zh`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Locales(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Pick the English text, then Chinese, then whatever comes first.
    pub fn preferred(&self) -> Option<&str> {
        match self {
            Self::Plain(text) => Some(text.as_str()),
            Self::Locales(locales) => locales
                .get("en")
                .or_else(|| locales.get("zh"))
                .or_else(|| locales.values().next())
                .map(String::as_str),
        }
    }
}

/// Parsed extension.yaml.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionMetadata {
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub description: Option<LocalizedText>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub kube_version: Option<String>,
    #[serde(default, rename = "ksVersion")]
    pub ks_version: Option<String>,
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,
    #[serde(default)]
    pub provider: BTreeMap<String, Maintainer>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// Container images the extension declares it uses.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub installation_mode: Option<String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl ExtensionMetadata {
    /// Check if `dir` holds an extension descriptor.
    pub fn exists_in(dir: &Path) -> bool {
        dir.join(METADATA_FILE).is_file()
    }

    /// Load `<dir>/extension.yaml`.
    pub fn load(dir: &Path) -> Result<Self, MetadataError> {
        let path = dir.join(METADATA_FILE);
        if !path.is_file() {
            return Err(MetadataError::NotFound(dir.to_path_buf()));
        }
        let content = std::fs::read_to_string(&path).map_err(|source| MetadataError::Io {
            path: path.clone(),
            source,
        })?;
        parse_extension_yaml(&content).map_err(|source| MetadataError::Yaml { path, source })
    }

    /// Translate into standard chart metadata.
    ///
    /// A local icon path is resolved against `base_dir` and embedded as a
    /// base64 data URI.
    pub fn to_chart_metadata(&self, base_dir: &Path) -> Result<ChartMetadata, MetadataError> {
        let chart = ChartMetadata {
            api_version: self
                .api_version
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            name: self.name.clone(),
            version: self.version.clone(),
            kube_version: self.kube_version.clone(),
            description: self
                .description
                .as_ref()
                .and_then(LocalizedText::preferred)
                .map(str::to_string),
            keywords: self.keywords.clone(),
            home: self.home.clone(),
            sources: self.sources.clone(),
            dependencies: self.dependencies.clone(),
            maintainers: self.maintainers.clone(),
            icon: self
                .icon
                .as_deref()
                .map(|icon| resolve_icon(icon, base_dir))
                .transpose()?,
            app_version: None,
            annotations: self.annotations.clone(),
        };

        chart.validate().map_err(|reason| MetadataError::Invalid {
            path: base_dir.join(METADATA_FILE),
            reason,
        })?;
        Ok(chart)
    }
}

/// Parse extension.yaml content.
pub fn parse_extension_yaml(content: &str) -> Result<ExtensionMetadata, serde_yaml::Error> {
    let metadata: Option<ExtensionMetadata> = serde_yaml::from_str(content)?;
    Ok(metadata.unwrap_or_default())
}

fn resolve_icon(icon: &str, base_dir: &Path) -> Result<String, MetadataError> {
    if icon.is_empty()
        || icon.starts_with("http://")
        || icon.starts_with("https://")
        || icon.starts_with("data:")
    {
        return Ok(icon.to_string());
    }

    let path = base_dir.join(icon);
    let mime = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(icon_mime_type)
        .ok_or_else(|| MetadataError::Icon {
            icon: icon.to_string(),
            reason: "unsupported file type".to_string(),
        })?;
    let content = std::fs::read(&path).map_err(|e| MetadataError::Icon {
        icon: icon.to_string(),
        reason: e.to_string(),
    })?;

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(content)))
}

fn icon_mime_type(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "svg" => Some("image/svg+xml"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "ico" => Some("image/x-icon"),
        _ => None,
    }
}
