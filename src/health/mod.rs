//! Health assessment
//!
//! Runs the health rules attached to a kind in table order and folds them
//! into one [`HealthVerdict`]. The final status is the most severe status any
//! rule raised; issues keep evaluation order.

mod rules;

pub use rules::{HealthRule, HealthThresholds};

use crate::models::{HealthStatus, HealthVerdict, NormalizedResource};
use crate::rules::KindRules;

#[derive(Debug, Clone, Default)]
pub struct HealthAssessor {
    thresholds: HealthThresholds,
}

impl HealthAssessor {
    pub fn new(thresholds: HealthThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &HealthThresholds {
        &self.thresholds
    }

    /// Judge one resource against the rules of its kind
    pub fn assess(&self, resource: &NormalizedResource, rules: &KindRules) -> HealthVerdict {
        let mut verdict = HealthVerdict::healthy();
        for rule in rules.health_rules {
            rule.evaluate(resource, &self.thresholds, &mut verdict);
        }

        if rules.requires_status && resource.status.is_none() && verdict.issues.is_empty() {
            return HealthVerdict::unknown();
        }

        if verdict.status != HealthStatus::Healthy {
            tracing::trace!(
                resource = %resource.full_name(),
                status = %verdict.status,
                issues = verdict.issues.len(),
                "Health rules fired"
            );
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::normalize_record;
    use crate::models::ResourceKind;
    use crate::rules::RuleTable;
    use serde_json::json;

    fn assess(raw: serde_json::Value) -> HealthVerdict {
        let resource = normalize_record(&raw).unwrap();
        let table = RuleTable::standard();
        HealthAssessor::default().assess(&resource, table.rules_for(resource.kind_tag))
    }

    #[test]
    fn test_running_pod_is_healthy() {
        let verdict = assess(json!({
            "kind": "Pod",
            "metadata": {"name": "web", "namespace": "default"},
            "status": {"phase": "Running", "containerStatuses": [{"name": "app", "ready": true}]}
        }));
        assert_eq!(verdict, HealthVerdict::healthy());
    }

    #[test]
    fn test_pod_without_status_is_unknown() {
        let verdict = assess(json!({
            "kind": "Pod",
            "metadata": {"name": "web", "namespace": "default"}
        }));
        assert_eq!(verdict.status, HealthStatus::Unknown);
        assert!(verdict.issues.is_empty());
    }

    #[test]
    fn test_deleting_pod_without_status_is_warning() {
        let verdict = assess(json!({
            "kind": "Pod",
            "metadata": {
                "name": "web",
                "namespace": "default",
                "deletionTimestamp": "2024-05-01T10:00:00Z"
            }
        }));
        assert_eq!(verdict.status, HealthStatus::Warning);
        assert_eq!(verdict.issues, vec!["Resource is being deleted"]);
    }

    #[test]
    fn test_configmap_without_status_is_healthy() {
        let verdict = assess(json!({
            "kind": "ConfigMap",
            "metadata": {"name": "settings", "namespace": "default"},
            "data": {"key": "value"}
        }));
        assert_eq!(verdict.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_restart_threshold_is_exclusive() {
        let thresholds = HealthAssessor::default().thresholds().restart_warning;
        let pod = |restarts: u64| {
            assess(json!({
                "kind": "Pod",
                "metadata": {"name": "web", "namespace": "default"},
                "status": {
                    "phase": "Running",
                    "containerStatuses": [{"name": "app", "ready": true, "restartCount": restarts}]
                }
            }))
        };
        assert_eq!(pod(thresholds).status, HealthStatus::Healthy);
        assert_eq!(
            pod(thresholds + 1).issues,
            vec![format!("Container app has high restart count ({})", thresholds + 1)]
        );
    }

    #[test]
    fn test_unsupported_kind_uses_conditions() {
        let verdict = assess(json!({
            "apiVersion": "example.com/v1",
            "kind": "Widget",
            "metadata": {"name": "w", "namespace": "default"},
            "status": {"conditions": [{"type": "Ready", "status": "False"}]}
        }));
        assert_eq!(verdict.status, HealthStatus::Error);
        assert_eq!(verdict.issues, vec!["Condition Ready is False"]);
    }

    #[test]
    fn test_node_not_ready_is_error() {
        let table = RuleTable::standard();
        let node = normalize_record(&json!({
            "kind": "Node",
            "metadata": {"name": "node-1"},
            "status": {"conditions": [{"type": "Ready", "status": "False"}]}
        }))
        .unwrap();
        let verdict =
            HealthAssessor::default().assess(&node, table.rules_for(Some(ResourceKind::Node)));
        assert_eq!(verdict.status, HealthStatus::Error);
    }
}
