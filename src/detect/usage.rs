//! Pod usage of configuration, storage and identity objects

use super::resolve_by_name;
use crate::index::ResourceIndex;
use crate::models::accessors::{pod_env_refs, pod_service_account, pod_volume_refs};
use crate::models::{NormalizedResource, RelationshipCandidate, RelationshipKind, ResourceKind};

/// `Uses` for every ConfigMap, Secret or claim mounted as a pod volume
pub fn detect_volume_usage(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    let namespace = resource.namespace.as_deref();
    pod_volume_refs(resource)
        .into_iter()
        .map(|volume| {
            let (peer, found) =
                resolve_by_name(index, "v1", volume.kind.as_str(), namespace, &volume.target);
            RelationshipCandidate::outbound(resource.reference(), peer, RelationshipKind::Uses)
                .with_metadata("via", "volume")
                .with_metadata("volume_name", volume.volume)
                .resolved(found)
        })
        .collect()
}

/// `Uses` for every ConfigMap or Secret consumed through container env
pub fn detect_env_usage(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    let namespace = resource.namespace.as_deref();
    pod_env_refs(resource)
        .into_iter()
        .map(|env| {
            let (peer, found) =
                resolve_by_name(index, "v1", env.kind.as_str(), namespace, &env.target);
            RelationshipCandidate::outbound(resource.reference(), peer, RelationshipKind::Uses)
                .with_metadata("via", "env")
                .with_metadata("container", env.container)
                .resolved(found)
        })
        .collect()
}

/// `References` to the pod's ServiceAccount (`default` when unset)
pub fn detect_service_account(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    let (peer, found) = resolve_by_name(
        index,
        "v1",
        ResourceKind::ServiceAccount.as_str(),
        resource.namespace.as_deref(),
        pod_service_account(resource),
    );
    vec![
        RelationshipCandidate::outbound(resource.reference(), peer, RelationshipKind::References)
            .resolved(found),
    ]
}
