//! Ingest tests
//!
//! File discovery, JSON / YAML decoding and normalization of raw records.

use std::fs;

use kubegraph::ingest::{Normalizer, discover_files, expand_records, load_files, normalize_record};
use kubegraph::{CancellationFlag, GraphError};
use serde_json::json;

const DEPLOYMENT_YAML: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: default
  uid: d1
  labels:
    app: web
spec:
  replicas: 2
---
apiVersion: v1
kind: Service
metadata:
  name: web
  namespace: default
spec:
  selector:
    app: web
"#;

#[test]
fn test_normalize_full_record() {
    let resource = normalize_record(&json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": "web-1",
            "namespace": "default",
            "uid": "p1",
            "labels": {"app": "web"},
            "annotations": {"note": "x"},
            "ownerReferences": [{"apiVersion": "apps/v1", "kind": "ReplicaSet", "name": "web-abc", "uid": "rs1", "controller": true}],
            "creationTimestamp": "2024-03-01T10:00:00Z",
            "resourceVersion": "42",
            "generation": 3,
            "finalizers": ["example.com/cleanup"]
        },
        "spec": {"nodeName": "node-1"},
        "status": {"phase": "Running"}
    }))
    .unwrap();

    assert_eq!(resource.kind, "Pod");
    assert_eq!(resource.identity(), "p1");
    assert_eq!(resource.labels["app"], "web");
    assert_eq!(resource.annotations["note"], "x");
    assert_eq!(resource.owner_references.len(), 1);
    assert!(resource.owner_references[0].controller);
    assert!(resource.creation_timestamp.is_some());
    assert!(resource.deletion_timestamp.is_none());
    assert_eq!(resource.resource_version.as_deref(), Some("42"));
    assert_eq!(resource.generation, Some(3));
    assert_eq!(resource.finalizers, vec!["example.com/cleanup"]);
    assert!(resource.status.is_some());
}

#[test]
fn test_normalize_defaults_and_top_level_payload() {
    let resource = normalize_record(&json!({
        "kind": "ConfigMap",
        "metadata": {"name": "settings"},
        "data": {"key": "value"}
    }))
    .unwrap();

    assert_eq!(resource.api_version, "v1");
    assert_eq!(resource.namespace, None);
    assert_eq!(resource.identity(), "ConfigMap/settings");
    assert_eq!(resource.spec["data"], json!({"key": "value"}));
    assert!(resource.status.is_none());
}

#[test]
fn test_normalize_rejects_missing_identity_fields() {
    let missing_kind = normalize_record(&json!({"metadata": {"name": "x"}}));
    assert!(matches!(missing_kind, Err(GraphError::MalformedRecord(_))));

    let missing_name = normalize_record(&json!({"kind": "Pod", "metadata": {"name": ""}}));
    assert!(matches!(missing_name, Err(GraphError::MalformedRecord(_))));
}

#[test]
fn test_expand_list_records() {
    let items = expand_records(json!({
        "kind": "List",
        "items": [
            {"kind": "Pod", "metadata": {"name": "a"}},
            {"kind": "Pod", "metadata": {"name": "b"}}
        ]
    }));
    assert_eq!(items.len(), 2);

    let single = expand_records(json!({"kind": "Pod", "metadata": {"name": "a"}}));
    assert_eq!(single.len(), 1);
}

#[test]
fn test_discover_files_recursive_and_sorted() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("b.yaml"), DEPLOYMENT_YAML).unwrap();
    fs::write(dir.path().join("a.json"), "{}").unwrap();
    fs::write(dir.path().join("nested").join("c.yml"), DEPLOYMENT_YAML).unwrap();
    fs::write(dir.path().join("README.md"), "ignored").unwrap();

    let files = discover_files(&[dir.path().to_path_buf()]).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.json", "b.yaml", "c.yml"]);

    let missing = discover_files(&[dir.path().join("absent")]);
    assert!(matches!(missing, Err(GraphError::Io { .. })));
}

#[test]
fn test_load_files_counts_decode_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cluster.yaml"), DEPLOYMENT_YAML).unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(
        dir.path().join("list.json"),
        json!({"kind": "List", "items": [
            {"kind": "ConfigMap", "metadata": {"name": "settings", "namespace": "default"}},
            {"metadata": {"name": "kindless"}}
        ]})
        .to_string(),
    )
    .unwrap();

    let files = discover_files(&[dir.path().to_path_buf()]).unwrap();
    let loaded = load_files(&files, &Normalizer::new(false), &CancellationFlag::new()).unwrap();

    assert_eq!(loaded.files, 2);
    assert_eq!(loaded.resources.len(), 3);
    assert_eq!(loaded.stats.parsed, 3);
    assert_eq!(loaded.stats.skipped, 1);
    assert_eq!(loaded.stats.errors, 1);

    let strict = load_files(&files, &Normalizer::new(true), &CancellationFlag::new());
    assert!(strict.is_err());
}
