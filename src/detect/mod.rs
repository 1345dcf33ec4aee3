//! Relationship detectors
//!
//! One module per relationship family. Every detector is a pure function of
//! `(resource, index)` returning zero or more candidates; none of them keep
//! state, so they can run in any order and on any thread once the index for
//! the run is complete.

mod ownership;
mod rbac;
mod routing;
mod scaling;
mod scheduling;
mod selector;
mod storage;
mod usage;

use crate::index::ResourceIndex;
use crate::models::{NormalizedResource, RelationshipCandidate, ResourceReference};

pub use ownership::detect_ownership;
pub use rbac::detect_binding_references;
pub use routing::detect_ingress_backends;
pub use scaling::detect_scale_target;
pub use scheduling::detect_scheduling;
pub use selector::{detect_network_policy_selector, detect_service_selector};
pub use storage::detect_storage_binding;
pub use usage::{detect_env_usage, detect_service_account, detect_volume_usage};

/// Detector identifiers used by the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detector {
    Ownership,
    VolumeUsage,
    EnvUsage,
    ServiceAccount,
    ServiceSelector,
    NetworkPolicySelector,
    StorageBinding,
    Scheduling,
    BindingReferences,
    IngressBackends,
    ScaleTarget,
}

impl Detector {
    pub fn name(&self) -> &'static str {
        match self {
            Detector::Ownership => "ownership",
            Detector::VolumeUsage => "volume-usage",
            Detector::EnvUsage => "env-usage",
            Detector::ServiceAccount => "service-account",
            Detector::ServiceSelector => "service-selector",
            Detector::NetworkPolicySelector => "network-policy-selector",
            Detector::StorageBinding => "storage-binding",
            Detector::Scheduling => "scheduling",
            Detector::BindingReferences => "binding-references",
            Detector::IngressBackends => "ingress-backends",
            Detector::ScaleTarget => "scale-target",
        }
    }

    pub fn detect(
        &self,
        resource: &NormalizedResource,
        index: &ResourceIndex<'_>,
    ) -> Vec<RelationshipCandidate> {
        match self {
            Detector::Ownership => detect_ownership(resource, index),
            Detector::VolumeUsage => detect_volume_usage(resource, index),
            Detector::EnvUsage => detect_env_usage(resource, index),
            Detector::ServiceAccount => detect_service_account(resource, index),
            Detector::ServiceSelector => detect_service_selector(resource, index),
            Detector::NetworkPolicySelector => detect_network_policy_selector(resource, index),
            Detector::StorageBinding => detect_storage_binding(resource, index),
            Detector::Scheduling => detect_scheduling(resource, index),
            Detector::BindingReferences => detect_binding_references(resource, index),
            Detector::IngressBackends => detect_ingress_backends(resource, index),
            Detector::ScaleTarget => detect_scale_target(resource, index),
        }
    }
}

/// Resolve a by-name reference through the index.
///
/// Returns the reference to the indexed resource when found, otherwise a
/// bare reference built from the given fields, plus whether it resolved.
pub(crate) fn resolve_by_name(
    index: &ResourceIndex<'_>,
    api_version: &str,
    kind: &str,
    namespace: Option<&str>,
    name: &str,
) -> (ResourceReference, bool) {
    match index.get_by_key(kind, namespace, name) {
        Some(found) => (found.reference(), true),
        None => (
            ResourceReference::by_name(api_version, kind, namespace, name),
            false,
        ),
    }
}
