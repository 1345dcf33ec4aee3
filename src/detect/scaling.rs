//! Autoscaler targets

use super::resolve_by_name;
use crate::index::ResourceIndex;
use crate::models::accessors::scale_target;
use crate::models::{NormalizedResource, RelationshipCandidate, RelationshipKind};

/// `Manages` from a HorizontalPodAutoscaler to its `scaleTargetRef`
pub fn detect_scale_target(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    let Some(target) = scale_target(resource) else {
        return Vec::new();
    };

    let api_version = target.api_version.as_deref().unwrap_or("apps/v1");
    let (peer, found) = resolve_by_name(
        index,
        api_version,
        &target.kind,
        resource.namespace.as_deref(),
        &target.name,
    );
    vec![
        RelationshipCandidate::outbound(resource.reference(), peer, RelationshipKind::Manages)
            .resolved(found),
    ]
}
