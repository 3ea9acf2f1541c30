//! Parsers for extension charts.
//!
//! This module provides parsers for:
//! - extension.yaml metadata
//! - Chart.yaml metadata
//! - Helm `--set` expressions
//! - Rendered Kubernetes manifests

pub mod chart;
pub mod extension;
pub mod manifest;
pub mod strvals;

pub use chart::{ChartMetadata, Dependency, Maintainer, parse_chart_yaml};
pub use extension::{ExtensionMetadata, LocalizedText, METADATA_FILE, MetadataError};
pub use manifest::{ContainerSpec, K8sObject, ManifestError, PodSpec, WorkloadData, decode_documents};
pub use strvals::{StrvalsError, ValueKind};
