//! Typed relationships between resources

use super::ResourceReference;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Strength of a relationship proven by an explicit field reference
pub const STRENGTH_CERTAIN: f64 = 1.0;

/// Strength of a relationship inferred from a label selector
pub const STRENGTH_SELECTOR: f64 = 0.5;

/// Metadata key marking an edge whose endpoint is not part of the run
pub const UNRESOLVED: &str = "unresolved";

/// Relationship metadata. Ordered so that serialized output is stable.
pub type Metadata = BTreeMap<String, Value>;

/// Closed set of relationship types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Owns,
    Manages,
    Uses,
    Exposes,
    Selects,
    Binds,
    References,
    DependsOn,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Owns => "owns",
            RelationshipKind::Manages => "manages",
            RelationshipKind::Uses => "uses",
            RelationshipKind::Exposes => "exposes",
            RelationshipKind::Selects => "selects",
            RelationshipKind::Binds => "binds",
            RelationshipKind::References => "references",
            RelationshipKind::DependsOn => "depends_on",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            RelationshipKind::Owns,
            RelationshipKind::Manages,
            RelationshipKind::Uses,
            RelationshipKind::Exposes,
            RelationshipKind::Selects,
            RelationshipKind::Binds,
            RelationshipKind::References,
            RelationshipKind::DependsOn,
        ]
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationshipKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown relationship type: {}", s))
    }
}

/// Direction of a relationship relative to the resource that declared it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Inbound,
    Bidirectional,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Inbound => "inbound",
            Direction::Bidirectional => "bidirectional",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outbound" => Ok(Direction::Outbound),
            "inbound" => Ok(Direction::Inbound),
            "bidirectional" => Ok(Direction::Bidirectional),
            _ => Err(format!("Unknown relationship direction: {}", s)),
        }
    }
}

/// A final, deduplicated edge of the resource graph.
///
/// `source -> target` always reads in the canonical direction (owner to
/// owned, selector to selected, user to used). `direction` records how the
/// declaring resource saw the edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRelationship {
    pub source: ResourceReference,
    pub target: ResourceReference,
    #[serde(rename = "relationship_type")]
    pub kind: RelationshipKind,
    pub direction: Direction,
    pub strength: f64,
    pub metadata: Metadata,
}

impl ResourceRelationship {
    /// `(source, target, type)` uniqueness key
    pub fn edge_key(&self) -> (String, String, RelationshipKind) {
        (self.source.identity(), self.target.identity(), self.kind)
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self.metadata.get(UNRESOLVED), Some(Value::Bool(true)))
    }
}

impl fmt::Display for ResourceRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.source, self.kind, self.target)
    }
}

/// A relationship as emitted by a single detector, before assembly.
///
/// `anchor` is the resource the detector ran on. `direction` is relative to
/// it: `Outbound` reads `anchor -> peer`, `Inbound` reads `peer -> anchor`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipCandidate {
    pub anchor: ResourceReference,
    pub peer: ResourceReference,
    pub kind: RelationshipKind,
    pub direction: Direction,
    pub strength: f64,
    pub metadata: Metadata,
}

impl RelationshipCandidate {
    /// Edge from the anchor to the peer
    pub fn outbound(anchor: ResourceReference, peer: ResourceReference, kind: RelationshipKind) -> Self {
        Self {
            anchor,
            peer,
            kind,
            direction: Direction::Outbound,
            strength: STRENGTH_CERTAIN,
            metadata: Metadata::new(),
        }
    }

    /// Edge from the peer into the anchor
    pub fn inbound(anchor: ResourceReference, peer: ResourceReference, kind: RelationshipKind) -> Self {
        Self {
            direction: Direction::Inbound,
            ..Self::outbound(anchor, peer, kind)
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Mark the peer as missing from the run when `resolved` is false
    pub fn resolved(self, resolved: bool) -> Self {
        if resolved {
            self
        } else {
            self.with_metadata(UNRESOLVED, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_match_persisted_values() {
        assert_eq!(RelationshipKind::DependsOn.as_str(), "depends_on");
        assert_eq!(
            "selects".parse::<RelationshipKind>(),
            Ok(RelationshipKind::Selects)
        );
        assert!("wires".parse::<RelationshipKind>().is_err());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("inbound".parse::<Direction>(), Ok(Direction::Inbound));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_resolved_flag() {
        let anchor = ResourceReference::by_name("v1", "Pod", Some("default"), "web");
        let peer = ResourceReference::by_name("v1", "ConfigMap", Some("default"), "cfg");

        let found = RelationshipCandidate::outbound(anchor.clone(), peer.clone(), RelationshipKind::Uses)
            .resolved(true);
        assert!(!found.metadata.contains_key(UNRESOLVED));

        let missing =
            RelationshipCandidate::outbound(anchor, peer, RelationshipKind::Uses).resolved(false);
        assert_eq!(missing.metadata.get(UNRESOLVED), Some(&Value::Bool(true)));
    }
}
