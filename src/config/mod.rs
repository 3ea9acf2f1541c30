pub mod types;

use crate::error::{ConfigError, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".extlint.toml";

/// Get the global config file path (~/.extlint.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (<dir>/.extlint.toml)
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load configuration from file or use defaults.
///
/// An explicit path must exist and parse. Otherwise the local config in the
/// current directory is tried first, then the global one; files that fail
/// to parse are skipped with a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<types::Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        return Ok(read_config(path)?);
    }

    let candidates = std::env::current_dir()
        .ok()
        .map(|dir| local_config_path(&dir))
        .into_iter()
        .chain(global_config_path());

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match read_config(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return Ok(config);
            }
            Err(e) => warn!("Ignoring {}: {}", path.display(), e),
        }
    }

    Ok(types::Config::default())
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> std::result::Result<types::Config, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParsingFailed(e.to_string()))
}

fn read_config(path: &Path) -> std::result::Result<types::Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
[helm]
binary = "/usr/local/bin/helm"

[lint]
quiet = true
strict = true

[checks]
disabled = ["KS1003", "images"]
"#,
        )
        .unwrap();

        assert_eq!(config.helm.binary, "/usr/local/bin/helm");
        assert_eq!(config.helm.release_name, "undefined");
        assert!(config.lint.quiet);
        assert!(!config.lint.with_subcharts);
        assert!(config.lint.strict);
        assert_eq!(config.checks.disabled, vec!["KS1003", "images"]);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), types::Config::default());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            parse_config("[lint]\nquiet = \"yes\"\n"),
            Err(ConfigError::ParsingFailed(_))
        ));
    }

    #[test]
    fn test_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = local_config_path(dir.path());
        fs::write(&path, "[checks]\ndisabled = [\"KS1001\"]\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.checks.disabled, vec!["KS1001"]);

        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(&missing)).is_err());
    }
}
