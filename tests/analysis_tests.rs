//! End-to-end analysis tests
//!
//! Runs the full normalize / index / detect / assemble / assess pipeline and
//! checks the properties every resulting graph must have.

use std::collections::HashSet;

use insta::assert_snapshot;
use kubegraph::models::{Direction, RelationshipKind, STRENGTH_CERTAIN};
use kubegraph::{Analyzer, AnalyzerOptions, CancellationFlag, ClusterState, GraphError, HealthStatus};
use serde_json::{Value, json};

fn cluster() -> Vec<Value> {
    vec![
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "web", "namespace": "default", "uid": "d1"},
            "spec": {"replicas": 1},
            "status": {"conditions": [{"type": "Available", "status": "True"}]}
        }),
        json!({
            "apiVersion": "apps/v1",
            "kind": "ReplicaSet",
            "metadata": {
                "name": "web-abc",
                "namespace": "default",
                "uid": "rs1",
                "ownerReferences": [{"apiVersion": "apps/v1", "kind": "Deployment", "name": "web", "uid": "d1", "controller": true}]
            }
        }),
        json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "web-abc-1",
                "namespace": "default",
                "uid": "p1",
                "labels": {"app": "web"},
                "ownerReferences": [{"apiVersion": "apps/v1", "kind": "ReplicaSet", "name": "web-abc", "uid": "rs1", "controller": true}]
            },
            "spec": {"nodeName": "node-1", "containers": [{"name": "app"}]},
            "status": {
                "phase": "Running",
                "containerStatuses": [{"name": "app", "ready": true, "restartCount": 0}]
            }
        }),
        json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": {"name": "web", "namespace": "default", "uid": "s1"},
            "spec": {"selector": {"app": "web"}}
        }),
        json!({
            "apiVersion": "v1",
            "kind": "Node",
            "metadata": {"name": "node-1", "uid": "n1"},
            "status": {"conditions": [{"type": "Ready", "status": "True"}]}
        }),
    ]
}

fn analyze(records: Vec<Value>) -> ClusterState {
    Analyzer::default().analyze_records(records).unwrap()
}

#[test]
fn test_analysis_is_idempotent() {
    let first = analyze(cluster());
    let second = analyze(cluster());

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.relationships, second.relationships);
    assert_eq!(first.health, second.health);
    assert_eq!(first.summary.resource_types, second.summary.resource_types);
}

#[test]
fn test_relationship_endpoints_are_sound() {
    let state = analyze(cluster());
    let present = |reference: &kubegraph::ResourceReference| {
        state.resources.iter().any(|r| reference.points_to(r))
    };

    for rel in &state.relationships {
        if rel.is_unresolved() {
            assert!(
                present(&rel.source) || present(&rel.target),
                "dangling edge with no known endpoint: {}",
                rel
            );
        } else {
            assert!(present(&rel.source), "unknown source in {}", rel);
            assert!(present(&rel.target), "unknown target in {}", rel);
        }
    }
}

#[test]
fn test_no_duplicate_edges() {
    let mut records = cluster();
    // A second service with the same selector adds edges, not duplicates
    records.push(json!({
        "kind": "Service",
        "metadata": {"name": "web-internal", "namespace": "default", "uid": "s2"},
        "spec": {"selector": {"app": "web"}}
    }));
    let state = analyze(records);

    let keys: HashSet<_> = state.relationships.iter().map(|r| r.edge_key()).collect();
    assert_eq!(keys.len(), state.relationships.len());
    assert_eq!(state.summary.relationship_types["selects"], 2);
}

#[test]
fn test_ownership_chain_reads_owner_to_owned() {
    let state = analyze(cluster());
    let owns: Vec<(String, String)> = state
        .relationships
        .iter()
        .filter(|r| r.kind == RelationshipKind::Owns)
        .map(|r| (r.source.identity(), r.target.identity()))
        .collect();

    assert_eq!(
        owns,
        vec![
            ("d1".to_string(), "rs1".to_string()),
            ("rs1".to_string(), "p1".to_string()),
        ]
    );
    for rel in state.relationships.iter().filter(|r| r.kind == RelationshipKind::Owns) {
        assert_eq!(rel.direction, Direction::Inbound);
        assert_eq!(rel.strength, STRENGTH_CERTAIN);
    }
}

#[test]
fn test_pod_relationships_queryable_from_state() {
    let state = analyze(cluster());
    let pod = state.resources.iter().find(|r| r.kind == "Pod").unwrap();

    let outgoing: Vec<RelationshipKind> = state.relationships_from(pod).map(|r| r.kind).collect();
    assert!(outgoing.contains(&RelationshipKind::DependsOn));
    assert!(outgoing.contains(&RelationshipKind::References));

    let incoming: Vec<RelationshipKind> = state.relationships_to(pod).map(|r| r.kind).collect();
    assert!(incoming.contains(&RelationshipKind::Owns));
    assert!(incoming.contains(&RelationshipKind::Selects));
}

#[test]
fn test_summary_report() {
    let state = analyze(cluster());

    assert_snapshot!(state.summary.to_string().trim_end(), @r"
    Resources: 5 (parsed 5, skipped 0, errors 0)
    Relationships: 5 (1 unresolved)
    Health: healthy=5 warning=0 error=0 unknown=0
    Issues: 0
    Kinds:
      Deployment: 1
      Node: 1
      Pod: 1
      ReplicaSet: 1
      Service: 1
    Namespaces:
      cluster-scoped: 1
      default: 4
    Relationship types:
      depends_on: 1
      owns: 2
      references: 1
      selects: 1
    ");
}

#[test]
fn test_json_document_shape() {
    let state = analyze(cluster());
    let document = state.to_json().unwrap();

    assert_eq!(document["resources"].as_array().unwrap().len(), 5);
    assert_eq!(document["relationships"].as_array().unwrap().len(), 5);
    assert!(document["analysis_timestamp"].is_string());
    assert_eq!(document["summary"]["total_resources"], json!(5));

    let pod = document["resources"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["kind"] == json!("Pod"))
        .unwrap();
    assert_eq!(pod["health_status"], json!("healthy"));
    assert_eq!(pod["issues"], json!([]));
}

#[test]
fn test_malformed_records_skipped_unless_strict() {
    let mut records = cluster();
    records.push(json!({"metadata": {"name": "no-kind"}}));
    records.push(json!("not an object"));

    let state = analyze(records.clone());
    assert_eq!(state.summary.total_resources, 5);
    assert_eq!(state.summary.parse_stats.skipped, 2);

    let strict = Analyzer::new(AnalyzerOptions {
        strict: true,
        ..AnalyzerOptions::default()
    });
    assert!(matches!(
        strict.analyze_records(records),
        Err(GraphError::MalformedRecord(_))
    ));
}

#[test]
fn test_unhealthy_resources_counted() {
    let mut records = cluster();
    records.push(json!({
        "kind": "Pod",
        "metadata": {"name": "broken", "namespace": "default", "uid": "p2"},
        "status": {"phase": "Failed"}
    }));
    records.push(json!({"kind": "Pod", "metadata": {"name": "unscheduled", "namespace": "default", "uid": "p3"}}));
    let state = analyze(records);

    assert_eq!(state.summary.health_status[HealthStatus::Error.as_str()], 1);
    assert_eq!(state.summary.health_status[HealthStatus::Unknown.as_str()], 1);
    assert_eq!(state.summary.issues_count, 1);

    let broken = state.resources.iter().find(|r| r.name == "broken").unwrap();
    assert_eq!(state.health_of(broken).unwrap().status, HealthStatus::Error);
}

#[test]
fn test_cancelled_file_run() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("cluster.json"),
        serde_json::to_string(&json!({"kind": "List", "items": cluster()})).unwrap(),
    )
    .unwrap();

    let cancel = CancellationFlag::new();
    cancel.cancel();
    let result = Analyzer::default().analyze_files(&[dir.path().to_path_buf()], &cancel);
    assert!(matches!(result, Err(GraphError::Cancelled)));

    let state = Analyzer::default()
        .analyze_files(&[dir.path().to_path_buf()], &CancellationFlag::new())
        .unwrap();
    assert_eq!(state.summary.total_resources, 5);
}
