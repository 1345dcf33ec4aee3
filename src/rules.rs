//! Per-kind rule table
//!
//! Maps each supported kind to the detectors that run on it and the health
//! rules that judge it. Built once per [`Analyzer`](crate::services::Analyzer)
//! and read-only afterwards. Kinds outside the closed set fall back to
//! [`RuleTable::unsupported`].

use std::collections::HashMap;

use crate::detect::Detector;
use crate::health::HealthRule;
use crate::models::ResourceKind;

/// Rules attached to a single kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindRules {
    pub detectors: &'static [Detector],
    pub health_rules: &'static [HealthRule],
    /// A missing `status` block makes the verdict `unknown` when nothing
    /// else fired
    pub requires_status: bool,
}

const WORKLOAD_HEALTH: &[HealthRule] = &[HealthRule::Deletion, HealthRule::Conditions];
const BASIC_HEALTH: &[HealthRule] = &[HealthRule::Deletion];
const OWNERSHIP_ONLY: &[Detector] = &[Detector::Ownership];

#[derive(Debug, Clone)]
pub struct RuleTable {
    by_kind: HashMap<ResourceKind, KindRules>,
    unsupported: KindRules,
}

impl RuleTable {
    pub fn standard() -> Self {
        let by_kind = ResourceKind::all()
            .iter()
            .map(|&kind| (kind, Self::rules_for_kind(kind)))
            .collect();

        Self {
            by_kind,
            unsupported: KindRules {
                detectors: OWNERSHIP_ONLY,
                health_rules: WORKLOAD_HEALTH,
                requires_status: false,
            },
        }
    }

    /// Rules for `kind`, or the fallback set when the kind is unsupported
    pub fn rules_for(&self, kind: Option<ResourceKind>) -> &KindRules {
        kind.and_then(|kind| self.by_kind.get(&kind))
            .unwrap_or(&self.unsupported)
    }

    pub fn unsupported(&self) -> &KindRules {
        &self.unsupported
    }

    fn rules_for_kind(kind: ResourceKind) -> KindRules {
        let (detectors, health_rules): (&'static [Detector], &'static [HealthRule]) = match kind {
            ResourceKind::Pod => (
                &[
                    Detector::Ownership,
                    Detector::VolumeUsage,
                    Detector::EnvUsage,
                    Detector::ServiceAccount,
                    Detector::Scheduling,
                ],
                &[
                    HealthRule::Deletion,
                    HealthRule::PodPhase,
                    HealthRule::ContainerStatuses,
                ],
            ),
            ResourceKind::Service => (
                &[Detector::Ownership, Detector::ServiceSelector],
                &[
                    HealthRule::Deletion,
                    HealthRule::ServiceSelector,
                    HealthRule::LoadBalancerIngress,
                ],
            ),
            ResourceKind::NetworkPolicy => (
                &[Detector::Ownership, Detector::NetworkPolicySelector],
                BASIC_HEALTH,
            ),
            ResourceKind::PersistentVolumeClaim => (
                &[Detector::Ownership, Detector::StorageBinding],
                &[HealthRule::Deletion, HealthRule::ClaimPhase],
            ),
            ResourceKind::PersistentVolume => (
                OWNERSHIP_ONLY,
                &[HealthRule::Deletion, HealthRule::VolumePhase],
            ),
            ResourceKind::ConfigMap | ResourceKind::Secret => (
                OWNERSHIP_ONLY,
                &[HealthRule::Deletion, HealthRule::LargeData],
            ),
            ResourceKind::RoleBinding | ResourceKind::ClusterRoleBinding => (
                &[Detector::Ownership, Detector::BindingReferences],
                BASIC_HEALTH,
            ),
            ResourceKind::Ingress => (
                &[Detector::Ownership, Detector::IngressBackends],
                BASIC_HEALTH,
            ),
            ResourceKind::HorizontalPodAutoscaler => (
                &[Detector::Ownership, Detector::ScaleTarget],
                WORKLOAD_HEALTH,
            ),
            ResourceKind::Deployment
            | ResourceKind::ReplicaSet
            | ResourceKind::StatefulSet
            | ResourceKind::DaemonSet
            | ResourceKind::Job
            | ResourceKind::CronJob
            | ResourceKind::Node => (OWNERSHIP_ONLY, WORKLOAD_HEALTH),
            ResourceKind::ServiceAccount
            | ResourceKind::Role
            | ResourceKind::ClusterRole
            | ResourceKind::Namespace => (OWNERSHIP_ONLY, BASIC_HEALTH),
        };

        KindRules {
            detectors,
            health_rules,
            requires_status: matches!(kind, ResourceKind::Pod | ResourceKind::Node),
        }
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_rules() {
        let table = RuleTable::standard();
        for kind in ResourceKind::all() {
            let rules = table.rules_for(Some(*kind));
            assert!(rules.detectors.contains(&Detector::Ownership), "{kind}");
            assert!(rules.health_rules.contains(&HealthRule::Deletion), "{kind}");
        }
    }

    #[test]
    fn test_unsupported_kind_falls_back() {
        let table = RuleTable::standard();
        assert_eq!(table.rules_for(None), table.unsupported());
        assert!(!table.rules_for(None).requires_status);
    }

    #[test]
    fn test_only_pods_and_nodes_require_status() {
        let table = RuleTable::standard();
        let requiring: Vec<_> = ResourceKind::all()
            .iter()
            .filter(|kind| table.rules_for(Some(**kind)).requires_status)
            .collect();
        assert_eq!(requiring, vec![&ResourceKind::Pod, &ResourceKind::Node]);
    }
}
