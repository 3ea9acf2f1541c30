//! Staging extension directories as Helm charts.
//!
//! Helm only understands Chart.yaml, so an extension directory is copied
//! into a temporary directory and given a Chart.yaml generated from its
//! extension.yaml.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::analyzer::extlint::parser::extension::{ExtensionMetadata, MetadataError};

const CHART_FILE: &str = "Chart.yaml";

/// A chart ready to hand to the chart engine.
#[derive(Debug)]
pub struct PreparedChart {
    /// Path Helm should load.
    path: PathBuf,
    /// Extension metadata, when the chart is an extension.
    extension: Option<ExtensionMetadata>,
    /// Temporary directory holding the staged copy, removed on drop.
    staging: Option<TempDir>,
}

impl PreparedChart {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> Option<&ExtensionMetadata> {
        self.extension.as_ref()
    }

    pub fn is_staged(&self) -> bool {
        self.staging.is_some()
    }
}

/// Prepare `path` for the chart engine.
///
/// - a directory with extension.yaml is staged with a generated Chart.yaml,
///   which takes priority over any Chart.yaml on disk
/// - a directory with only Chart.yaml, or a packaged archive, is used in place
pub fn prepare_chart(path: &Path) -> Result<PreparedChart, MetadataError> {
    if path.is_dir() && ExtensionMetadata::exists_in(path) {
        return stage_extension(path);
    }

    if (path.is_dir() && path.join(CHART_FILE).is_file()) || (path.is_file() && is_chart_archive(path)) {
        debug!("Using chart {} in place", path.display());
        return Ok(PreparedChart {
            path: path.to_path_buf(),
            extension: None,
            staging: None,
        });
    }

    Err(MetadataError::NotFound(path.to_path_buf()))
}

/// Check if a file name looks like a packaged chart.
pub fn is_chart_archive(path: &Path) -> bool {
    let name = path.to_string_lossy();
    name.ends_with(".tgz") || name.ends_with(".tar.gz")
}

fn stage_extension(path: &Path) -> Result<PreparedChart, MetadataError> {
    let extension = ExtensionMetadata::load(path)?;
    let chart = extension.to_chart_metadata(path)?;

    let staging = tempfile::Builder::new()
        .prefix("extlint-")
        .tempdir()
        .map_err(|source| MetadataError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
    let target = staging.path().join(&chart.name);

    copy_tree(path, &target)?;

    let chart_yaml = chart.to_yaml().map_err(|e| MetadataError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let chart_file = target.join(CHART_FILE);
    fs::write(&chart_file, chart_yaml).map_err(|source| MetadataError::Io {
        path: chart_file,
        source,
    })?;

    info!(
        "Staged extension {} {} at {}",
        chart.name,
        chart.version,
        target.display()
    );

    Ok(PreparedChart {
        path: target,
        extension: Some(extension),
        staging: Some(staging),
    })
}

fn copy_tree(source: &Path, target: &Path) -> Result<(), MetadataError> {
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| MetadataError::Io {
            path: e.path().unwrap_or(source).to_path_buf(),
            source: e.into(),
        })?;
        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let dest = target.join(relative);

        let io_err = |source| MetadataError::Io {
            path: entry.path().to_path_buf(),
            source,
        };
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(io_err)?;
        } else {
            fs::copy(entry.path(), &dest).map_err(io_err)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_stage_extension() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "extension.yaml", "name: demo\nversion: 0.1.0\nimages: [nginx]\n");
        write(dir.path(), "Chart.yaml", "apiVersion: v2\nname: stale\nversion: 9.9.9\n");
        write(dir.path(), "values.yaml", "replicas: 1\n");
        write(dir.path(), "templates/deployment.yaml", "kind: Deployment\n");

        let prepared = prepare_chart(dir.path()).unwrap();
        assert!(prepared.is_staged());
        assert!(prepared.path().ends_with("demo"));
        assert!(prepared.path().join("templates/deployment.yaml").is_file());
        assert_eq!(prepared.extension().map(|e| e.images.len()), Some(1));

        let chart_yaml = fs::read_to_string(prepared.path().join("Chart.yaml")).unwrap();
        assert!(chart_yaml.contains("name: demo"));
        assert!(!chart_yaml.contains("stale"));

        let staged = prepared.path().to_path_buf();
        drop(prepared);
        assert!(!staged.exists());
    }

    #[test]
    fn test_plain_chart_used_in_place() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Chart.yaml", "apiVersion: v2\nname: plain\nversion: 1.0.0\n");

        let prepared = prepare_chart(dir.path()).unwrap();
        assert!(!prepared.is_staged());
        assert_eq!(prepared.path(), dir.path());
        assert!(prepared.extension().is_none());
    }

    #[test]
    fn test_archive_used_in_place() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "dep-1.0.0.tgz", "");

        let archive = dir.path().join("dep-1.0.0.tgz");
        let prepared = prepare_chart(&archive).unwrap();
        assert_eq!(prepared.path(), archive.as_path());
    }

    #[test]
    fn test_no_metadata_is_fatal() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            prepare_chart(dir.path()),
            Err(MetadataError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_extension_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "extension.yaml", "name: demo\nversion: not-semver\n");
        assert!(matches!(
            prepare_chart(dir.path()),
            Err(MetadataError::Invalid { .. })
        ));
    }
}
