//! Value override merging.
//!
//! Combines values files and `--set*` expressions into one value tree,
//! in the same order Helm applies them: files, JSON sets, typed sets,
//! string sets, file sets, literal sets.

use std::io::Read;
use std::path::PathBuf;

use log::debug;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::analyzer::extlint::parser::strvals::{self, StrvalsError, ValueKind};

/// User-supplied value overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueOptions {
    /// Values files (`-f`): local paths, `-` for stdin, or http(s) URLs.
    pub value_files: Vec<String>,
    /// `--set` expressions.
    pub values: Vec<String>,
    /// `--set-string` expressions.
    pub string_values: Vec<String>,
    /// `--set-json` expressions.
    pub json_values: Vec<String>,
    /// `--set-file` expressions.
    pub file_values: Vec<String>,
    /// `--set-literal` expressions.
    pub literal_values: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ValuesError {
    #[error("failed to read values file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch values from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("values in {0} must be a mapping")]
    NotAMapping(String),

    #[error("failed parsing --set data: {0}")]
    Parse(#[from] StrvalsError),
}

impl ValueOptions {
    /// Check if no override was given.
    pub fn is_empty(&self) -> bool {
        self.value_files.is_empty()
            && self.values.is_empty()
            && self.string_values.is_empty()
            && self.json_values.is_empty()
            && self.file_values.is_empty()
            && self.literal_values.is_empty()
    }

    /// Merge all overrides into a single mapping. Later entries win.
    pub fn merge_values(&self) -> Result<Value, ValuesError> {
        let mut base = Value::Mapping(Mapping::new());

        for file in &self.value_files {
            let current = read_values_file(file)?;
            merge_maps(&mut base, current);
        }

        let expressions = [
            (&self.json_values, ValueKind::Json),
            (&self.values, ValueKind::Typed),
            (&self.string_values, ValueKind::String),
            (&self.file_values, ValueKind::File),
            (&self.literal_values, ValueKind::Literal),
        ];
        for (list, kind) in expressions {
            for expression in list {
                strvals::parse_into(expression, &mut base, kind)?;
            }
        }

        Ok(base)
    }
}

/// Deep-merge `overlay` into `base`. Non-mapping values replace.
pub fn merge_maps(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                let nested = value.is_mapping()
                    && base_map.get(&key).is_some_and(|existing| existing.is_mapping());
                if !nested {
                    base_map.insert(key, value);
                } else if let Some(existing) = base_map.get_mut(&key) {
                    merge_maps(existing, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn read_values_file(spec: &str) -> Result<Value, ValuesError> {
    let content = if spec == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| ValuesError::Io {
                path: PathBuf::from("-"),
                source,
            })?;
        buf
    } else if spec.starts_with("http://") || spec.starts_with("https://") {
        fetch_remote(spec)?
    } else {
        std::fs::read_to_string(spec).map_err(|source| ValuesError::Io {
            path: PathBuf::from(spec),
            source,
        })?
    };

    let value: Value = serde_yaml::from_str(&content).map_err(|source| ValuesError::Yaml {
        path: spec.to_string(),
        source,
    })?;

    match value {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(value),
        _ => Err(ValuesError::NotAMapping(spec.to_string())),
    }
}

fn fetch_remote(url: &str) -> Result<String, ValuesError> {
    debug!("Fetching values file from {}", url);
    let to_error = |source| ValuesError::Fetch {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(format!("extlint/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(to_error)?;

    client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(to_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn is_empty_values(values: &Value) -> bool {
        match values {
            Value::Null => true,
            Value::Mapping(map) => map.is_empty(),
            _ => false,
        }
    }

    fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
        path.split('.').try_fold(value, |current, key| current.get(key))
    }

    #[test]
    fn test_empty_options_merge_to_empty_mapping() {
        let options = ValueOptions::default();
        assert!(options.is_empty());
        let merged = options.merge_values().unwrap();
        assert!(is_empty_values(&merged));
    }

    #[test]
    fn test_files_merge_left_to_right() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.yaml");
        let second = dir.path().join("b.yaml");
        fs::write(&first, "image:\n  repository: nginx\n  tag: \"1.0\"\nreplicas: 1\n").unwrap();
        fs::write(&second, "image:\n  tag: \"2.0\"\n").unwrap();

        let options = ValueOptions {
            value_files: vec![first.display().to_string(), second.display().to_string()],
            ..Default::default()
        };
        let merged = options.merge_values().unwrap();

        assert_eq!(get(&merged, "image.repository"), Some(&Value::String("nginx".into())));
        assert_eq!(get(&merged, "image.tag"), Some(&Value::String("2.0".into())));
        assert_eq!(get(&merged, "replicas"), Some(&Value::Number(1.into())));
    }

    #[test]
    fn test_set_overrides_files_and_json() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("values.yaml");
        fs::write(&file, "global:\n  imageRegistry: docker.io\n").unwrap();

        let options = ValueOptions {
            value_files: vec![file.display().to_string()],
            json_values: vec![r#"global={"imageRegistry": "json.io", "pullPolicy": "Always"}"#.into()],
            values: vec!["global.imageRegistry=set.io".into()],
            ..Default::default()
        };
        let merged = options.merge_values().unwrap();

        assert_eq!(get(&merged, "global.imageRegistry"), Some(&Value::String("set.io".into())));
        assert_eq!(get(&merged, "global.pullPolicy"), Some(&Value::String("Always".into())));
    }

    #[test]
    fn test_string_values_apply_after_typed() {
        let options = ValueOptions {
            values: vec!["replicas=3".into()],
            string_values: vec!["replicas=3".into()],
            ..Default::default()
        };
        let merged = options.merge_values().unwrap();
        assert_eq!(get(&merged, "replicas"), Some(&Value::String("3".into())));
    }

    #[test]
    fn test_empty_values_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("empty.yaml");
        fs::write(&file, "").unwrap();

        let options = ValueOptions {
            value_files: vec![file.display().to_string()],
            ..Default::default()
        };
        assert!(is_empty_values(&options.merge_values().unwrap()));
    }

    #[test]
    fn test_non_mapping_values_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("list.yaml");
        fs::write(&file, "- a\n- b\n").unwrap();

        let options = ValueOptions {
            value_files: vec![file.display().to_string()],
            ..Default::default()
        };
        assert!(matches!(options.merge_values(), Err(ValuesError::NotAMapping(_))));
    }

    #[test]
    fn test_missing_values_file() {
        let options = ValueOptions {
            value_files: vec!["/nonexistent/values.yaml".into()],
            ..Default::default()
        };
        assert!(matches!(options.merge_values(), Err(ValuesError::Io { .. })));
    }

    #[test]
    fn test_bad_set_expression() {
        let options = ValueOptions {
            values: vec!["novalue".into()],
            ..Default::default()
        };
        assert!(matches!(options.merge_values(), Err(ValuesError::Parse(_))));
    }

    #[test]
    fn test_merge_maps_replaces_scalars() {
        let mut base: Value = serde_yaml::from_str("a:\n  b: 1\nc: [1]\n").unwrap();
        let overlay: Value = serde_yaml::from_str("a: scalar\nc:\n  d: 2\n").unwrap();
        merge_maps(&mut base, overlay);

        assert_eq!(get(&base, "a"), Some(&Value::String("scalar".into())));
        assert_eq!(get(&base, "c.d"), Some(&Value::Number(2.into())));
    }
}
