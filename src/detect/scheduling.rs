//! Pod placement on nodes

use super::resolve_by_name;
use crate::index::ResourceIndex;
use crate::models::accessors::pod_node_name;
use crate::models::{NormalizedResource, RelationshipCandidate, RelationshipKind, ResourceKind};

/// `DependsOn` from a scheduled Pod to its Node
pub fn detect_scheduling(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    let Some(node_name) = pod_node_name(resource) else {
        return Vec::new();
    };

    let (peer, found) = resolve_by_name(index, "v1", ResourceKind::Node.as_str(), None, node_name);
    vec![
        RelationshipCandidate::outbound(resource.reference(), peer, RelationshipKind::DependsOn)
            .with_metadata("scheduled", true)
            .resolved(found),
    ]
}
