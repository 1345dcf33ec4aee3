//! Claim to volume binding

use super::resolve_by_name;
use crate::index::ResourceIndex;
use crate::models::accessors::pvc_volume_name;
use crate::models::{NormalizedResource, RelationshipCandidate, RelationshipKind, ResourceKind};

/// `Binds` from a PersistentVolumeClaim to the PersistentVolume named in
/// `spec.volumeName`. Unbound claims produce nothing.
pub fn detect_storage_binding(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    let Some(volume_name) = pvc_volume_name(resource) else {
        return Vec::new();
    };

    let (peer, found) = resolve_by_name(
        index,
        "v1",
        ResourceKind::PersistentVolume.as_str(),
        None,
        volume_name,
    );
    vec![
        RelationshipCandidate::outbound(resource.reference(), peer, RelationshipKind::Binds)
            .resolved(found),
    ]
}
