//! Health assessment tests
//!
//! Verdicts for the kinds with dedicated rules, severity folding, threshold
//! handling and the unknown state.

use kubegraph::health::{HealthAssessor, HealthThresholds};
use kubegraph::ingest::normalize_record;
use kubegraph::rules::RuleTable;
use kubegraph::{HealthStatus, HealthVerdict};
use serde_json::{Value, json};

fn assess_with(thresholds: HealthThresholds, raw: Value) -> HealthVerdict {
    let resource = normalize_record(&raw).unwrap();
    let table = RuleTable::standard();
    HealthAssessor::new(thresholds).assess(&resource, table.rules_for(resource.kind_tag))
}

fn assess(raw: Value) -> HealthVerdict {
    assess_with(HealthThresholds::default(), raw)
}

fn pod_with_status(status: Value) -> Value {
    json!({
        "kind": "Pod",
        "metadata": {"name": "web-1", "namespace": "default"},
        "spec": {"containers": [{"name": "app"}]},
        "status": status
    })
}

#[test]
fn test_pending_pod_with_crash_loop_is_error() {
    let verdict = assess(pod_with_status(json!({
        "phase": "Pending",
        "containerStatuses": [{
            "name": "app",
            "ready": false,
            "restartCount": 1,
            "state": {"waiting": {"reason": "CrashLoopBackOff"}}
        }]
    })));

    assert_eq!(verdict.status, HealthStatus::Error);
    assert_eq!(
        verdict.issues,
        vec![
            "Pod is in Pending state",
            "Container app is not ready",
            "Container app is waiting: CrashLoopBackOff",
        ]
    );
}

#[test]
fn test_failed_pod_is_error() {
    let verdict = assess(pod_with_status(json!({"phase": "Failed"})));
    assert_eq!(verdict.status, HealthStatus::Error);
    assert_eq!(verdict.issues, vec!["Pod is in Failed state"]);
}

#[test]
fn test_image_pull_back_off_is_error() {
    let verdict = assess(pod_with_status(json!({
        "phase": "Running",
        "containerStatuses": [{
            "name": "app",
            "ready": false,
            "state": {"waiting": {"reason": "ImagePullBackOff"}}
        }]
    })));
    assert_eq!(verdict.status, HealthStatus::Error);
}

#[test]
fn test_restart_threshold_is_configurable() {
    let raw = pod_with_status(json!({
        "phase": "Running",
        "containerStatuses": [{"name": "app", "ready": true, "restartCount": 3}]
    }));

    assert_eq!(assess(raw.clone()).status, HealthStatus::Healthy);

    let strict = HealthThresholds {
        restart_warning: 2,
        ..HealthThresholds::default()
    };
    let verdict = assess_with(strict, raw);
    assert_eq!(verdict.status, HealthStatus::Warning);
    assert_eq!(verdict.issues, vec!["Container app has high restart count (3)"]);
}

#[test]
fn test_pod_and_node_without_status_are_unknown() {
    let pod = assess(json!({"kind": "Pod", "metadata": {"name": "p", "namespace": "default"}}));
    assert_eq!(pod, HealthVerdict::unknown());

    let node = assess(json!({"kind": "Node", "metadata": {"name": "node-1"}}));
    assert_eq!(node.status, HealthStatus::Unknown);
}

#[test]
fn test_deleting_pod_without_status_is_warning() {
    let verdict = assess(json!({
        "kind": "Pod",
        "metadata": {
            "name": "p",
            "namespace": "default",
            "deletionTimestamp": "2024-01-01T00:00:00Z"
        }
    }));
    assert_eq!(verdict.status, HealthStatus::Warning);
    assert_eq!(verdict.issues, vec!["Resource is being deleted"]);
}

#[test]
fn test_service_rules() {
    let no_selector = assess(json!({
        "kind": "Service",
        "metadata": {"name": "external", "namespace": "default"},
        "spec": {"type": "ClusterIP"}
    }));
    assert_eq!(no_selector.status, HealthStatus::Warning);
    assert_eq!(no_selector.issues, vec!["Service has no selector"]);

    let pending_lb = assess(json!({
        "kind": "Service",
        "metadata": {"name": "public", "namespace": "default"},
        "spec": {"type": "LoadBalancer", "selector": {"app": "web"}},
        "status": {"loadBalancer": {}}
    }));
    assert_eq!(pending_lb.issues, vec!["LoadBalancer service has no ingress"]);

    let ready_lb = assess(json!({
        "kind": "Service",
        "metadata": {"name": "public", "namespace": "default"},
        "spec": {"type": "LoadBalancer", "selector": {"app": "web"}},
        "status": {"loadBalancer": {"ingress": [{"ip": "10.0.0.1"}]}}
    }));
    assert_eq!(ready_lb, HealthVerdict::healthy());
}

#[test]
fn test_large_config_map_is_warning() {
    let thresholds = HealthThresholds {
        large_object_bytes: 16,
        ..HealthThresholds::default()
    };
    let verdict = assess_with(
        thresholds,
        json!({
            "kind": "ConfigMap",
            "metadata": {"name": "big", "namespace": "default"},
            "data": {"payload": "0123456789abcdef"}
        }),
    );
    assert_eq!(verdict.status, HealthStatus::Warning);
    assert_eq!(verdict.issues.len(), 1);
    assert!(verdict.issues[0].starts_with("ConfigMap is large ("));

    let small = assess(json!({
        "kind": "Secret",
        "metadata": {"name": "small", "namespace": "default"},
        "data": {"token": "c2VjcmV0"}
    }));
    assert_eq!(small.status, HealthStatus::Healthy);
}

#[test]
fn test_claim_and_volume_phases() {
    let lost = assess(json!({
        "kind": "PersistentVolumeClaim",
        "metadata": {"name": "data", "namespace": "default"},
        "status": {"phase": "Lost"}
    }));
    assert_eq!(lost.status, HealthStatus::Error);

    let pending = assess(json!({
        "kind": "PersistentVolumeClaim",
        "metadata": {"name": "data", "namespace": "default"},
        "status": {"phase": "Pending"}
    }));
    assert_eq!(pending.status, HealthStatus::Warning);

    let failed = assess(json!({
        "kind": "PersistentVolume",
        "metadata": {"name": "pv-1"},
        "status": {"phase": "Failed"}
    }));
    assert_eq!(failed.issues, vec!["PersistentVolume is in Failed phase"]);
}

#[test]
fn test_false_critical_condition_is_error() {
    let verdict = assess(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": "web", "namespace": "default"},
        "status": {"conditions": [
            {"type": "Progressing", "status": "True"},
            {"type": "Available", "status": "False"},
            {"type": "ReplicaFailure", "status": "False"}
        ]}
    }));
    assert_eq!(verdict.status, HealthStatus::Error);
    assert_eq!(verdict.issues, vec!["Condition Available is False"]);
}

#[test]
fn test_unsupported_kind_uses_fallback_rules() {
    let verdict = assess(json!({
        "apiVersion": "example.com/v1",
        "kind": "Widget",
        "metadata": {"name": "w", "namespace": "default"},
        "status": {"conditions": [{"type": "Ready", "status": "False"}]}
    }));
    assert_eq!(verdict.status, HealthStatus::Error);

    // No status block is not a problem for kinds without status requirements
    let bare = assess(json!({
        "apiVersion": "example.com/v1",
        "kind": "Widget",
        "metadata": {"name": "w", "namespace": "default"}
    }));
    assert_eq!(bare, HealthVerdict::healthy());
}
