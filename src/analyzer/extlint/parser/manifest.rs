//! Typed decoding of rendered Kubernetes manifests.
//!
//! Only the fields the extension rules look at are kept: the object name,
//! the pod-template node selector and the container images.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to decode a document in {file}: {source}")]
    Decode {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("document in {file} is not a mapping")]
    NotAMapping { file: String },
}

/// A decoded Kubernetes object.
#[derive(Debug, Clone, PartialEq)]
pub enum K8sObject {
    Deployment(Box<WorkloadData>),
    StatefulSet(Box<WorkloadData>),
    ReplicaSet(Box<WorkloadData>),
    DaemonSet(Box<WorkloadData>),
    Job(Box<WorkloadData>),
    CronJob(Box<WorkloadData>),
    Pod(Box<WorkloadData>),
    Unknown(Box<UnknownObject>),
}

/// Name and pod template of a workload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkloadData {
    pub name: String,
    pub pod_spec: Option<PodSpec>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodSpec {
    /// `None` when the pod spec has no `nodeSelector` mapping at all.
    pub node_selector: Option<BTreeMap<String, String>>,
    pub containers: Vec<ContainerSpec>,
    pub init_containers: Vec<ContainerSpec>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    /// `None` when the image is missing or not a string.
    pub image: Option<String>,
}

/// Any kind the rules do not inspect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownObject {
    pub kind: String,
    pub name: String,
}

impl K8sObject {
    /// Get the object kind as written in the manifest.
    pub fn kind(&self) -> &str {
        match self {
            Self::Deployment(_) => "Deployment",
            Self::StatefulSet(_) => "StatefulSet",
            Self::ReplicaSet(_) => "ReplicaSet",
            Self::DaemonSet(_) => "DaemonSet",
            Self::Job(_) => "Job",
            Self::CronJob(_) => "CronJob",
            Self::Pod(_) => "Pod",
            Self::Unknown(u) => &u.kind,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Unknown(u) => &u.name,
            _ => self.workload().map(|w| w.name.as_str()).unwrap_or_default(),
        }
    }

    /// Workload data, for every kind that carries a pod template.
    pub fn workload(&self) -> Option<&WorkloadData> {
        match self {
            Self::Deployment(w)
            | Self::StatefulSet(w)
            | Self::ReplicaSet(w)
            | Self::DaemonSet(w)
            | Self::Job(w)
            | Self::CronJob(w)
            | Self::Pod(w) => Some(w),
            Self::Unknown(_) => None,
        }
    }

    /// Pod spec of a workload, if present.
    pub fn pod_spec(&self) -> Option<&PodSpec> {
        self.workload().and_then(|w| w.pod_spec.as_ref())
    }
}

/// Decode the YAML documents in `content`, one at a time.
///
/// Empty (null) documents are skipped. `file` is only used in errors.
/// Callers stop at the first error, after handling every object before it.
pub fn decode_documents<'a>(
    content: &'a str,
    file: &'a str,
) -> impl Iterator<Item = Result<K8sObject, ManifestError>> + 'a {
    serde_yaml::Deserializer::from_str(content).filter_map(move |document| {
        match Value::deserialize(document) {
            Ok(Value::Null) => None,
            Ok(value @ Value::Mapping(_)) => Some(Ok(parse_k8s_object(&value))),
            Ok(_) => Some(Err(ManifestError::NotAMapping {
                file: file.to_string(),
            })),
            Err(source) => Some(Err(ManifestError::Decode {
                file: file.to_string(),
                source,
            })),
        }
    })
}

fn parse_k8s_object(value: &Value) -> K8sObject {
    let kind = get_string(value, "kind").unwrap_or_default();

    match kind.as_str() {
        "Deployment" => K8sObject::Deployment(Box::new(parse_workload(value, template_spec))),
        "StatefulSet" => K8sObject::StatefulSet(Box::new(parse_workload(value, template_spec))),
        "ReplicaSet" => K8sObject::ReplicaSet(Box::new(parse_workload(value, template_spec))),
        "DaemonSet" => K8sObject::DaemonSet(Box::new(parse_workload(value, template_spec))),
        "Job" => K8sObject::Job(Box::new(parse_workload(value, template_spec))),
        "Pod" => K8sObject::Pod(Box::new(parse_workload(value, |v| v.get("spec")))),
        // CronJob has spec.jobTemplate.spec.template.spec
        "CronJob" => K8sObject::CronJob(Box::new(parse_workload(value, |v| {
            template_spec(v.get("spec")?.get("jobTemplate")?)
        }))),
        _ => K8sObject::Unknown(Box::new(UnknownObject {
            kind,
            name: object_name(value),
        })),
    }
}

fn template_spec(value: &Value) -> Option<&Value> {
    value.get("spec")?.get("template")?.get("spec")
}

fn parse_workload(value: &Value, spec: impl Fn(&Value) -> Option<&Value>) -> WorkloadData {
    WorkloadData {
        name: object_name(value),
        pod_spec: spec(value).filter(|s| s.is_mapping()).map(parse_pod_spec),
    }
}

fn parse_pod_spec(spec: &Value) -> PodSpec {
    PodSpec {
        node_selector: spec
            .get("nodeSelector")
            .and_then(Value::as_mapping)
            .map(|mapping| {
                mapping
                    .iter()
                    .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.as_str()?.to_string())))
                    .collect()
            }),
        containers: parse_containers(spec.get("containers")),
        init_containers: parse_containers(spec.get("initContainers")),
    }
}

fn parse_containers(containers: Option<&Value>) -> Vec<ContainerSpec> {
    let Some(arr) = containers.and_then(Value::as_sequence) else {
        return Vec::new();
    };
    arr.iter()
        .map(|c| ContainerSpec {
            name: get_string(c, "name").unwrap_or_default(),
            image: get_string(c, "image"),
        })
        .collect()
}

fn object_name(value: &Value) -> String {
    value
        .get("metadata")
        .and_then(|m| get_string(m, "name"))
        .unwrap_or_default()
}

fn get_string(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(content: &str, file: &str) -> Result<Vec<K8sObject>, ManifestError> {
        decode_documents(content, file).collect()
    }

    #[test]
    fn test_decode_deployment() {
        let yaml = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  template:
    spec:
      nodeSelector:
        kubernetes.io/os: linux
      initContainers:
        - name: init
          image: busybox:1.36
      containers:
        - name: app
          image: nginx:1.25
        - name: sidecar
"#;
        let objects = decode_all(yaml, "web.yaml").unwrap();
        assert_eq!(objects.len(), 1);

        let obj = &objects[0];
        assert_eq!(obj.kind(), "Deployment");
        assert_eq!(obj.name(), "web");

        let spec = obj.pod_spec().unwrap();
        assert_eq!(
            spec.node_selector.as_ref().and_then(|n| n.get("kubernetes.io/os")),
            Some(&"linux".to_string())
        );
        assert_eq!(spec.init_containers[0].image.as_deref(), Some("busybox:1.36"));
        assert_eq!(spec.containers.len(), 2);
        assert_eq!(spec.containers[1].image, None);
    }

    #[test]
    fn test_decode_cronjob_and_pod_paths() {
        let yaml = r#"
kind: CronJob
metadata:
  name: backup
spec:
  jobTemplate:
    spec:
      template:
        spec:
          containers:
            - name: backup
              image: restic:latest
---
kind: Pod
metadata:
  name: debug
spec:
  containers:
    - name: shell
      image: alpine
"#;
        let objects = decode_all(yaml, "jobs.yaml").unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(
            objects[0].pod_spec().unwrap().containers[0].image.as_deref(),
            Some("restic:latest")
        );
        assert_eq!(objects[1].kind(), "Pod");
        assert_eq!(
            objects[1].pod_spec().unwrap().containers[0].name,
            "shell"
        );
    }

    #[test]
    fn test_empty_documents_are_skipped() {
        let yaml = "---\n# only a comment\n---\nkind: ConfigMap\nmetadata:\n  name: cfg\n---\n";
        let objects = decode_all(yaml, "cfg.yaml").unwrap();
        assert_eq!(objects.len(), 1);
        assert!(matches!(&objects[0], K8sObject::Unknown(u) if u.kind == "ConfigMap"));
        assert_eq!(objects[0].name(), "cfg");
        assert!(objects[0].pod_spec().is_none());
    }

    #[test]
    fn test_workload_without_pod_spec() {
        let objects = decode_all("kind: Deployment\nmetadata:\n  name: bare\n", "d.yaml").unwrap();
        assert!(objects[0].workload().is_some());
        assert!(objects[0].pod_spec().is_none());
    }

    #[test]
    fn test_missing_node_selector_is_none() {
        let yaml = "kind: Job\nspec:\n  template:\n    spec:\n      containers: []\n";
        let objects = decode_all(yaml, "job.yaml").unwrap();
        assert_eq!(objects[0].pod_spec().unwrap().node_selector, None);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode_all("kind: [unclosed\n", "bad.yaml"),
            Err(ManifestError::Decode { .. })
        ));
        assert!(matches!(
            decode_all("just a string\n", "scalar.yaml"),
            Err(ManifestError::NotAMapping { .. })
        ));
    }

    #[test]
    fn test_objects_before_a_bad_document_are_yielded() {
        let yaml = "kind: Pod\nmetadata:\n  name: first\n---\nkind: [broken\n";
        let mut documents = decode_documents(yaml, "pod.yaml");
        assert_eq!(documents.next().unwrap().unwrap().name(), "first");
        assert!(matches!(documents.next(), Some(Err(ManifestError::Decode { .. }))));
    }
}
