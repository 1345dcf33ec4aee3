//! Ingress backends

use super::resolve_by_name;
use crate::index::ResourceIndex;
use crate::models::accessors::ingress_backend_services;
use crate::models::{NormalizedResource, RelationshipCandidate, RelationshipKind, ResourceKind};

/// `Exposes` from an Ingress to each backend Service
pub fn detect_ingress_backends(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    ingress_backend_services(resource)
        .into_iter()
        .map(|service| {
            let (peer, found) = resolve_by_name(
                index,
                "v1",
                ResourceKind::Service.as_str(),
                resource.namespace.as_deref(),
                &service,
            );
            RelationshipCandidate::outbound(resource.reference(), peer, RelationshipKind::Exposes)
                .resolved(found)
        })
        .collect()
}
