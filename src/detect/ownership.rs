//! Ownership from `metadata.ownerReferences`

use crate::index::ResourceIndex;
use crate::models::{
    NormalizedResource, RelationshipCandidate, RelationshipKind, ResourceKind, ResourceReference,
};

/// One `Owns` edge per owner reference, pointing from the owner into this
/// resource. Owners missing from the run are kept as unresolved edges.
pub fn detect_ownership(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    resource
        .owner_references
        .iter()
        .map(|owner| {
            let found = index.resolve_owner(owner, resource.namespace.as_deref());
            let peer = match found {
                Some(owner_resource) => owner_resource.reference(),
                None => {
                    let cluster_scoped = ResourceKind::parse_optional(&owner.kind)
                        .map(|kind| kind.is_cluster_scoped())
                        .unwrap_or(false);
                    ResourceReference {
                        api_version: owner.api_version.clone().unwrap_or_else(|| "v1".to_string()),
                        kind: owner.kind.clone(),
                        name: owner.name.clone(),
                        namespace: if cluster_scoped {
                            None
                        } else {
                            resource.namespace.clone()
                        },
                        uid: owner.uid.clone(),
                    }
                }
            };

            RelationshipCandidate::inbound(resource.reference(), peer, RelationshipKind::Owns)
                .with_metadata("controller", owner.controller)
                .resolved(found.is_some())
        })
        .collect()
}
