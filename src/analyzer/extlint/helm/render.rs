//! Rendered template sets.

use std::collections::BTreeMap;

const SOURCE_PREFIX: &str = "# Source: ";

/// Rendered text per template file, keyed by file name
/// (e.g. `demo/templates/deployment.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTemplates {
    files: BTreeMap<String, String>,
}

impl RenderedTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All files, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Only the files ending in `.yaml` or `.yml`.
    pub fn yaml_files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(name, _)| is_yaml_file(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenderedTemplates {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

pub fn is_yaml_file(name: &str) -> bool {
    name.ends_with(".yaml") || name.ends_with(".yml")
}

/// Split `helm template` output back into per-file text.
///
/// Helm writes `# Source: <file>` above every document. Documents from the
/// same file are joined with `---`. Anything before the first header is
/// dropped.
pub fn split_rendered_output(output: &str) -> RenderedTemplates {
    let mut files: BTreeMap<String, String> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        if let Some(source) = line.strip_prefix(SOURCE_PREFIX) {
            let name = source.trim().to_string();
            let content = files.entry(name.clone()).or_default();
            if !content.is_empty() {
                content.push_str("---\n");
            }
            current = Some(name);
            continue;
        }

        if line.trim_end() == "---" {
            current = None;
            continue;
        }

        if let Some(content) = current.as_ref().and_then(|name| files.get_mut(name)) {
            content.push_str(line);
            content.push('\n');
        }
    }

    RenderedTemplates { files }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"---
# Source: demo/templates/service.yaml
apiVersion: v1
kind: Service
metadata:
  name: demo
---
# Source: demo/templates/workloads.yaml
kind: Deployment
metadata:
  name: api
---
# Source: demo/templates/workloads.yaml
kind: Job
metadata:
  name: migrate
---
# Source: demo/templates/notes.txt
hello
"#;

    #[test]
    fn test_split_by_source_header() {
        let rendered = split_rendered_output(OUTPUT);
        assert_eq!(rendered.len(), 3);
        assert_eq!(
            rendered.get("demo/templates/service.yaml"),
            Some("apiVersion: v1\nkind: Service\nmetadata:\n  name: demo\n")
        );

        let workloads = rendered.get("demo/templates/workloads.yaml").unwrap();
        assert!(workloads.contains("name: api\n---\nkind: Job"));
    }

    #[test]
    fn test_yaml_files_filter() {
        let rendered = split_rendered_output(OUTPUT);
        let names: Vec<_> = rendered.yaml_files().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["demo/templates/service.yaml", "demo/templates/workloads.yaml"]
        );
    }

    #[test]
    fn test_empty_output() {
        assert!(split_rendered_output("").is_empty());
        assert!(split_rendered_output("no headers here\n").is_empty());
    }

    #[test]
    fn test_from_iter() {
        let rendered: RenderedTemplates = [("a.yml", "x"), ("b.txt", "y")].into_iter().collect();
        assert_eq!(rendered.yaml_files().count(), 1);
        assert_eq!(rendered.get("b.txt"), Some("y"));
    }
}
