//! Resource index tests
//!
//! Lookup by UID and key, owner resolution and label selection over a
//! normalized resource set.

use kubegraph::ingest::normalize_record;
use kubegraph::models::{NormalizedResource, OwnerReference, StringMap};
use kubegraph::ResourceIndex;
use serde_json::{Value, json};

fn normalize(records: Vec<Value>) -> Vec<NormalizedResource> {
    records
        .iter()
        .map(|record| normalize_record(record).unwrap())
        .collect()
}

fn pod(name: &str, namespace: &str, uid: &str, labels: Value) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {"name": name, "namespace": namespace, "uid": uid, "labels": labels},
        "spec": {},
        "status": {"phase": "Running"}
    })
}

fn selector(pairs: &[(&str, &str)]) -> StringMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_lookup_by_uid_and_key() {
    let resources = normalize(vec![
        pod("web-1", "default", "pod-1", json!({"app": "web"})),
        json!({"kind": "Node", "metadata": {"name": "node-1", "uid": "node-uid"}}),
    ]);
    let index = ResourceIndex::build(&resources);

    assert_eq!(index.len(), 2);
    assert_eq!(index.get_by_uid("pod-1").unwrap().name, "web-1");
    assert_eq!(
        index
            .get_by_key("Pod", Some("default"), "web-1")
            .unwrap()
            .uid
            .as_deref(),
        Some("pod-1")
    );
    // Cluster-scoped resources are keyed without a namespace
    assert!(index.get_by_key("Node", None, "node-1").is_some());
    assert!(index.get_by_key("Node", Some(""), "node-1").is_some());
    assert!(index.get_by_key("Pod", Some("other"), "web-1").is_none());
    assert!(index.get_by_uid("missing").is_none());
}

#[test]
fn test_key_collision_later_wins_uid_stays_unambiguous() {
    let resources = normalize(vec![
        pod("web-1", "default", "old-uid", json!({})),
        pod("web-1", "default", "new-uid", json!({})),
    ]);
    let index = ResourceIndex::build(&resources);

    let by_key = index.get_by_key("Pod", Some("default"), "web-1").unwrap();
    assert_eq!(by_key.uid.as_deref(), Some("new-uid"));
    assert_eq!(
        index.get_by_uid("old-uid").unwrap().uid.as_deref(),
        Some("old-uid")
    );
}

#[test]
fn test_resolve_owner_by_uid_only_when_present() {
    let resources = normalize(vec![json!({
        "apiVersion": "apps/v1",
        "kind": "ReplicaSet",
        "metadata": {"name": "web-abc", "namespace": "default", "uid": "rs-1"}
    })]);
    let index = ResourceIndex::build(&resources);

    let matching = OwnerReference {
        api_version: Some("apps/v1".to_string()),
        kind: "ReplicaSet".to_string(),
        name: "web-abc".to_string(),
        uid: Some("rs-1".to_string()),
        controller: true,
    };
    assert!(index.resolve_owner(&matching, Some("default")).is_some());

    // A stale UID does not fall back to the name
    let stale = OwnerReference {
        uid: Some("rs-0".to_string()),
        ..matching.clone()
    };
    assert!(index.resolve_owner(&stale, Some("default")).is_none());

    let without_uid = OwnerReference {
        uid: None,
        ..matching
    };
    assert!(index.resolve_owner(&without_uid, Some("default")).is_some());
}

#[test]
fn test_select_matches_label_superset_in_namespace() {
    let resources = normalize(vec![
        pod("web-1", "default", "p1", json!({"app": "web", "tier": "front"})),
        pod("web-2", "default", "p2", json!({"app": "web"})),
        pod("api-1", "default", "p3", json!({"app": "api"})),
        pod("web-3", "staging", "p4", json!({"app": "web"})),
    ]);
    let index = ResourceIndex::build(&resources);

    let selected: Vec<&str> = index
        .select("Pod", Some("default"), &selector(&[("app", "web")]))
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(selected, vec!["web-1", "web-2"]);

    let narrow = index.select(
        "Pod",
        Some("default"),
        &selector(&[("app", "web"), ("tier", "front")]),
    );
    assert_eq!(narrow.len(), 1);
    assert_eq!(narrow[0].name, "web-1");

    assert!(index
        .select("Pod", Some("default"), &selector(&[("app", "db")]))
        .is_empty());
    assert!(index
        .select("Service", Some("default"), &selector(&[("app", "web")]))
        .is_empty());
}

#[test]
fn test_empty_index() {
    let resources: Vec<NormalizedResource> = Vec::new();
    let index = ResourceIndex::build(&resources);

    assert!(index.is_empty());
    assert!(index.select("Pod", None, &StringMap::new()).is_empty());
}
