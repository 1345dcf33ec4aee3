//! RoleBinding / ClusterRoleBinding references

use super::resolve_by_name;
use crate::index::ResourceIndex;
use crate::models::accessors::{binding_subjects, role_ref};
use crate::models::{NormalizedResource, RelationshipCandidate, RelationshipKind, ResourceKind};

const RBAC_API_VERSION: &str = "rbac.authorization.k8s.io/v1";

/// `References` to ServiceAccount subjects and to the bound role
pub fn detect_binding_references(
    resource: &NormalizedResource,
    index: &ResourceIndex<'_>,
) -> Vec<RelationshipCandidate> {
    let mut candidates = Vec::new();

    for subject in binding_subjects(resource) {
        if subject.kind != ResourceKind::ServiceAccount.as_str() {
            continue;
        }
        let namespace = subject
            .namespace
            .as_deref()
            .or(resource.namespace.as_deref());
        let (peer, found) = resolve_by_name(index, "v1", &subject.kind, namespace, &subject.name);
        candidates.push(
            RelationshipCandidate::outbound(
                resource.reference(),
                peer,
                RelationshipKind::References,
            )
            .with_metadata("subject", true)
            .resolved(found),
        );
    }

    if let Some(role) = role_ref(resource) {
        let namespace = match ResourceKind::parse_optional(&role.kind) {
            Some(ResourceKind::ClusterRole) => None,
            _ => resource.namespace.as_deref(),
        };
        let (peer, found) =
            resolve_by_name(index, RBAC_API_VERSION, &role.kind, namespace, &role.name);
        candidates.push(
            RelationshipCandidate::outbound(
                resource.reference(),
                peer,
                RelationshipKind::References,
            )
            .with_metadata("role_ref", true)
            .resolved(found),
        );
    }

    candidates
}
