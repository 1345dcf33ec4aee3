//! Candidate to relationship assembly
//!
//! Detectors describe an edge from the point of view of the resource they
//! ran on. The assembler turns every candidate into a canonical
//! `source -> target` edge and keeps one edge per `(source, target, type)`.

use std::collections::HashMap;

use crate::models::{Direction, RelationshipCandidate, RelationshipKind, ResourceRelationship};

type EdgeKey = (String, String, RelationshipKind);

/// Accumulates candidates and produces the final relationship list
#[derive(Debug, Default)]
pub struct RelationshipAssembler {
    /// Final edges, in first-seen order
    edges: Vec<ResourceRelationship>,
    /// Map from edge key to index in `edges`
    edge_index: HashMap<EdgeKey, usize>,
    /// Candidates dropped as duplicates
    duplicates: usize,
}

impl RelationshipAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate, keeping the stronger edge on a key collision.
    ///
    /// Ties keep the earlier candidate, so output depends only on input order.
    pub fn add(&mut self, candidate: RelationshipCandidate) {
        let relationship = canonicalize(candidate);
        let key = relationship.edge_key();

        match self.edge_index.get(&key) {
            Some(&index) => {
                self.duplicates += 1;
                if relationship.strength > self.edges[index].strength {
                    self.edges[index] = relationship;
                }
            }
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(relationship);
            }
        }
    }

    pub fn extend(&mut self, candidates: impl IntoIterator<Item = RelationshipCandidate>) {
        for candidate in candidates {
            self.add(candidate);
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn finish(self) -> Vec<ResourceRelationship> {
        tracing::debug!(
            relationships = self.edges.len(),
            duplicates = self.duplicates,
            "Assembled relationships"
        );
        self.edges
    }
}

/// Orient a candidate as `source -> target`
fn canonicalize(candidate: RelationshipCandidate) -> ResourceRelationship {
    let RelationshipCandidate {
        anchor,
        peer,
        kind,
        direction,
        strength,
        metadata,
    } = candidate;

    let (source, target) = match direction {
        Direction::Inbound => (peer, anchor),
        Direction::Outbound | Direction::Bidirectional => (anchor, peer),
    };

    ResourceRelationship {
        source,
        target,
        kind,
        direction,
        strength,
        metadata,
    }
}

/// Assemble a full candidate list in one call
pub fn assemble(candidates: impl IntoIterator<Item = RelationshipCandidate>) -> Vec<ResourceRelationship> {
    let mut assembler = RelationshipAssembler::new();
    assembler.extend(candidates);
    assembler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResourceReference, STRENGTH_SELECTOR};

    fn reference(kind: &str, name: &str) -> ResourceReference {
        ResourceReference::by_name("v1", kind, Some("default"), name)
    }

    #[test]
    fn test_inbound_candidate_is_flipped() {
        let pod = reference("Pod", "web-1");
        let rs = reference("ReplicaSet", "web");
        let edges = assemble([RelationshipCandidate::inbound(
            pod.clone(),
            rs.clone(),
            RelationshipKind::Owns,
        )]);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, rs);
        assert_eq!(edges[0].target, pod);
        assert_eq!(edges[0].direction, Direction::Inbound);
    }

    #[test]
    fn test_duplicates_keep_strongest() {
        let svc = reference("Service", "web");
        let pod = reference("Pod", "web-1");
        let mut assembler = RelationshipAssembler::new();
        assembler.add(
            RelationshipCandidate::outbound(svc.clone(), pod.clone(), RelationshipKind::Selects)
                .with_strength(STRENGTH_SELECTOR),
        );
        assembler.add(RelationshipCandidate::outbound(
            svc,
            pod,
            RelationshipKind::Selects,
        ));
        assert_eq!(assembler.duplicates(), 1);

        let edges = assembler.finish();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].strength, 1.0);
    }

    #[test]
    fn test_ties_keep_first_metadata() {
        let pod = reference("Pod", "web-1");
        let cm = reference("ConfigMap", "settings");
        let edges = assemble([
            RelationshipCandidate::outbound(pod.clone(), cm.clone(), RelationshipKind::Uses)
                .with_metadata("via", "volume"),
            RelationshipCandidate::outbound(pod, cm, RelationshipKind::Uses)
                .with_metadata("via", "env"),
        ]);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].metadata["via"], "volume");
    }

    #[test]
    fn test_same_endpoints_different_kind_are_distinct() {
        let binding = reference("RoleBinding", "read");
        let sa = reference("ServiceAccount", "app");
        let edges = assemble([
            RelationshipCandidate::outbound(binding.clone(), sa.clone(), RelationshipKind::References),
            RelationshipCandidate::outbound(binding, sa, RelationshipKind::Manages),
        ]);
        assert_eq!(edges.len(), 2);
    }
}
