//! Individual health rules
//!
//! Each rule reads one aspect of a resource through the typed accessors and
//! raises zero or more issues on the verdict. Rules never lower a status.

use crate::models::accessors::{
    conditions, container_states, data_size, load_balancer_ingress_count, pod_phase,
    service_selector, service_type, status_phase,
};
use crate::models::{HealthStatus, HealthVerdict, NormalizedResource};

/// Condition types whose `False` status is an error
const CRITICAL_CONDITIONS: &[&str] = &["Ready", "Available", "Progressing"];

/// Waiting reasons that mean the container cannot start
const FATAL_WAIT_REASONS: &[&str] = &["ImagePullBackOff", "CrashLoopBackOff"];

/// Tunable limits used by the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    pub large_object_bytes: usize,
    pub restart_warning: u64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            large_object_bytes: 1_048_576,
            restart_warning: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthRule {
    Deletion,
    PodPhase,
    ContainerStatuses,
    ServiceSelector,
    LoadBalancerIngress,
    LargeData,
    ClaimPhase,
    VolumePhase,
    Conditions,
}

impl HealthRule {
    pub fn evaluate(
        &self,
        resource: &NormalizedResource,
        thresholds: &HealthThresholds,
        verdict: &mut HealthVerdict,
    ) {
        match self {
            HealthRule::Deletion => {
                if resource.deletion_timestamp.is_some() {
                    verdict.raise(HealthStatus::Warning, "Resource is being deleted");
                }
            }
            HealthRule::PodPhase => match pod_phase(resource) {
                "Failed" => verdict.raise(HealthStatus::Error, "Pod is in Failed state"),
                "Pending" => verdict.raise(HealthStatus::Warning, "Pod is in Pending state"),
                _ => {}
            },
            HealthRule::ContainerStatuses => {
                for container in container_states(resource) {
                    if !container.ready {
                        verdict.raise(
                            HealthStatus::Warning,
                            format!("Container {} is not ready", container.name),
                        );
                    }
                    if let Some(reason) = container
                        .waiting_reason
                        .as_deref()
                        .filter(|reason| FATAL_WAIT_REASONS.contains(reason))
                    {
                        verdict.raise(
                            HealthStatus::Error,
                            format!("Container {} is waiting: {}", container.name, reason),
                        );
                    }
                    if container.restart_count > thresholds.restart_warning {
                        verdict.raise(
                            HealthStatus::Warning,
                            format!(
                                "Container {} has high restart count ({})",
                                container.name, container.restart_count
                            ),
                        );
                    }
                }
            }
            HealthRule::ServiceSelector => {
                if service_selector(resource).is_empty() {
                    verdict.raise(HealthStatus::Warning, "Service has no selector");
                }
            }
            HealthRule::LoadBalancerIngress => {
                if service_type(resource) == "LoadBalancer"
                    && load_balancer_ingress_count(resource) == 0
                {
                    verdict.raise(HealthStatus::Warning, "LoadBalancer service has no ingress");
                }
            }
            HealthRule::LargeData => {
                let size = data_size(resource);
                if size > thresholds.large_object_bytes {
                    verdict.raise(
                        HealthStatus::Warning,
                        format!("{} is large ({} bytes)", resource.kind, size),
                    );
                }
            }
            HealthRule::ClaimPhase => match status_phase(resource) {
                Some("Lost") => verdict.raise(
                    HealthStatus::Error,
                    "PersistentVolumeClaim is in Lost phase",
                ),
                Some("Pending") => verdict.raise(
                    HealthStatus::Warning,
                    "PersistentVolumeClaim is in Pending phase",
                ),
                _ => {}
            },
            HealthRule::VolumePhase => {
                if status_phase(resource) == Some("Failed") {
                    verdict.raise(HealthStatus::Error, "PersistentVolume is in Failed phase");
                }
            }
            HealthRule::Conditions => {
                for condition in conditions(resource) {
                    if condition.status == "False"
                        && CRITICAL_CONDITIONS.contains(&condition.condition_type.as_str())
                    {
                        verdict.raise(
                            HealthStatus::Error,
                            format!("Condition {} is False", condition.condition_type),
                        );
                    }
                }
            }
        }
    }
}
