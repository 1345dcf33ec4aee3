//! Label-selector based relationships
//!
//! Selectors are expanded against the index at detection time, so the graph
//! holds one concrete edge per selected Pod.

use crate::index::ResourceIndex;
use crate::models::accessors::{network_policy_selector, service_selector};
use crate::models::{
    NormalizedResource, RelationshipCandidate, RelationshipKind, ResourceKind, STRENGTH_SELECTOR,
    StringMap,
};
use serde_json::{Map, Value};

/// `Selects` from a Service to every Pod its selector matches
pub fn detect_service_selector(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    select_pods(resource, &service_selector(resource), index)
}

/// `Selects` from a NetworkPolicy to every Pod its `podSelector` matches
pub fn detect_network_policy_selector(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    select_pods(resource, &network_policy_selector(resource), index)
}

fn select_pods(
    resource: &NormalizedResource,
    selector: &StringMap,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    if selector.is_empty() {
        return Vec::new();
    }

    let selector_value: Map<String, Value> = selector
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    index
        .select(
            ResourceKind::Pod.as_str(),
            resource.namespace.as_deref(),
            selector,
        )
        .into_iter()
        .map(|pod| {
            RelationshipCandidate::outbound(
                resource.reference(),
                pod.reference(),
                RelationshipKind::Selects,
            )
            .with_strength(STRENGTH_SELECTOR)
            .with_metadata("selector", Value::Object(selector_value.clone()))
        })
        .collect()
}
