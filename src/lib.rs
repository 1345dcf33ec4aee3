//! kubegraph library
//!
//! Builds a relationship graph and health assessment from exported
//! Kubernetes manifests and persists runs to SQLite. The `kubegraph` binary
//! is a thin CLI over this crate; tests drive it directly.

pub mod config;
pub mod detect;
pub mod error;
pub mod graph;
pub mod health;
pub mod index;
pub mod ingest;
pub mod models;
pub mod rules;
pub mod services;
pub mod store;

// Re-export commonly used types for convenience
pub use error::{GraphError, GraphResult};
pub use index::ResourceIndex;
pub use models::{
    ClusterState, HealthStatus, HealthVerdict, NormalizedResource, RelationshipKind,
    ResourceKind, ResourceReference, ResourceRelationship,
};
pub use services::{Analyzer, AnalyzerOptions, BatchRunner, CancellationFlag};
pub use store::ClusterStore;
