//! Resource graph model layer
//!
//! Structure:
//! - `resource_kind.rs` - Closed enum of kinds with dedicated rules
//! - `resource.rs` - Normalized resources and references to them
//! - `relationship.rs` - Relationship types, candidates and final edges
//! - `health.rs` - Health status and verdicts
//! - `cluster_state.rs` - The aggregate produced by one run
//! - `accessors.rs` - Typed, fail-closed access to `spec` / `status`

pub mod accessors;
mod cluster_state;
mod health;
mod relationship;
mod resource;
mod resource_kind;

pub use cluster_state::{CLUSTER_SCOPED, ClusterState, ParseStats, RunSummary};
pub use health::{HealthStatus, HealthVerdict};
pub use relationship::{
    Direction, Metadata, RelationshipCandidate, RelationshipKind, ResourceRelationship,
    STRENGTH_CERTAIN, STRENGTH_SELECTOR, UNRESOLVED,
};
pub use resource::{NormalizedResource, OwnerReference, ResourceKey, ResourceReference, StringMap};
pub use resource_kind::ResourceKind;
