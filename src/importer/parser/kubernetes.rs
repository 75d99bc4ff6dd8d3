//! YAML parsing for Kubernetes manifests.

use super::yaml_to_json;
use crate::error::ImportError;
use crate::importer::types::KubernetesManifest;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Parse a YAML stream containing one or more Kubernetes objects.
///
/// Documents without a string `kind` (comments, empty documents, plain
/// values files) are skipped. `default_namespace` is applied to objects
/// that do not set `metadata.namespace`.
pub fn parse_kubernetes(
    source: &str,
    default_namespace: Option<&str>,
) -> Result<Vec<KubernetesManifest>, ImportError> {
    let mut manifests = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(source).enumerate() {
        let value = serde_yaml::Value::deserialize(document)
            .map_err(|e| ImportError::Kubernetes(format!("document {}: {}", index + 1, e)))?;
        let value = yaml_to_json(&value)
            .map_err(|e| ImportError::Kubernetes(format!("document {}: {}", index + 1, e)))?;

        if let Some(manifest) = parse_object(&value, default_namespace) {
            manifests.push(manifest);
        }
    }

    log::debug!("Parsed {} Kubernetes object(s)", manifests.len());
    Ok(manifests)
}

fn parse_object(value: &Value, default_namespace: Option<&str>) -> Option<KubernetesManifest> {
    let kind = value.get("kind")?.as_str()?;
    let metadata = value.get("metadata");

    let spec = value
        .get("spec")
        .or_else(|| value.get("data"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);

    Some(KubernetesManifest {
        api_version: get_string(value, "apiVersion"),
        kind: kind.to_string(),
        name: metadata.and_then(|m| get_string(m, "name")),
        namespace: metadata
            .and_then(|m| get_string(m, "namespace"))
            .or_else(|| default_namespace.map(String::from)),
        spec,
    })
}

fn get_string(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFESTS: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: prod
spec:
  replicas: 3
---
# a comment-only document
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
data:
  LOG_LEVEL: debug
---
replicaCount: 2
"#;

    #[test]
    fn test_parse_multi_document_stream() {
        let manifests = parse_kubernetes(MANIFESTS, None).unwrap();

        assert_eq!(manifests.len(), 2);
        assert_eq!(manifests[0].kind, "Deployment");
        assert_eq!(manifests[0].name.as_deref(), Some("web"));
        assert_eq!(manifests[0].namespace.as_deref(), Some("prod"));
        assert_eq!(manifests[0].spec["replicas"], 3);
        assert_eq!(manifests[1].kind, "ConfigMap");
        assert_eq!(manifests[1].spec["LOG_LEVEL"], "debug");
    }

    #[test]
    fn test_default_namespace() {
        let manifests = parse_kubernetes(MANIFESTS, Some("staging")).unwrap();

        assert_eq!(manifests[0].namespace.as_deref(), Some("prod"));
        assert_eq!(manifests[1].namespace.as_deref(), Some("staging"));
    }

    #[test]
    fn test_empty_source() {
        assert!(parse_kubernetes("", None).unwrap().is_empty());
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_kubernetes("kind: Pod\nmetadata: [broken\n", None).unwrap_err();
        assert!(err.to_string().starts_with("Kubernetes import failed:"));
    }
}
