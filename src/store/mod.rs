//! SQLite persistence for analysis runs
//!
//! Structure:
//! - `schema.rs` - Tables, indexes and connection pragmas
//! - `writer.rs` - Transactional write of one run or batch
//! - `query.rs` - Read-only queries (filters, traversal, summaries, history)

mod query;
mod schema;
mod writer;

use std::path::Path;

use rusqlite::Connection;

use crate::error::{GraphError, GraphResult};
use crate::models::ClusterState;
use crate::services::RunSink;

pub use query::{
    HealthRecord, HealthSummary, RelationshipFilter, ResourceFilter, RunRecord, StoredRelationship,
    StoredResource, StoredSummary, TraversalStep,
};
pub use writer::WriteStats;

/// Handle over one SQLite database
pub struct ClusterStore {
    conn: Connection,
    replace_existing: bool,
}

impl ClusterStore {
    /// Open (or create) the database at `path`
    pub fn open(path: &Path) -> GraphResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| GraphError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        tracing::debug!("Opening database {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> GraphResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> GraphResult<Self> {
        schema::apply_pragmas(&conn)?;
        schema::create_schema(&conn)?;
        Ok(Self {
            conn,
            replace_existing: true,
        })
    }

    /// Keep (`false`) or drop (`true`, the default) earlier runs' resources
    /// and relationships on write
    pub fn with_replace_existing(mut self, replace_existing: bool) -> Self {
        self.replace_existing = replace_existing;
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Persist a whole run atomically
    pub fn write(&mut self, state: &ClusterState) -> GraphResult<WriteStats> {
        writer::write_state(&mut self.conn, state, self.replace_existing)
    }

    pub fn resources(&self, filter: &ResourceFilter) -> GraphResult<Vec<StoredResource>> {
        query::query_resources(&self.conn, filter)
    }

    pub fn relationships(&self, filter: &RelationshipFilter) -> GraphResult<Vec<StoredRelationship>> {
        query::query_relationships(&self.conn, filter)
    }

    pub fn relationships_from(&self, source_uid: &str) -> GraphResult<Vec<StoredRelationship>> {
        query::relationships_from(&self.conn, source_uid)
    }

    pub fn relationships_to(
        &self,
        kind: &str,
        name: &str,
        namespace: Option<&str>,
    ) -> GraphResult<Vec<StoredRelationship>> {
        query::relationships_to(&self.conn, kind, name, namespace)
    }

    pub fn traverse(&self, source_uid: &str, max_depth: usize) -> GraphResult<Vec<TraversalStep>> {
        query::traverse(&self.conn, source_uid, max_depth)
    }

    pub fn health_summary(&self) -> GraphResult<HealthSummary> {
        query::health_summary(&self.conn)
    }

    pub fn health_history(&self, resource_uid: &str) -> GraphResult<Vec<HealthRecord>> {
        query::health_history(&self.conn, resource_uid)
    }

    pub fn latest_summary(&self) -> GraphResult<Option<StoredSummary>> {
        query::latest_summary(&self.conn)
    }

    pub fn runs(&self) -> GraphResult<Vec<RunRecord>> {
        query::list_runs(&self.conn)
    }
}

impl RunSink for ClusterStore {
    fn persist(&mut self, state: &ClusterState) -> GraphResult<()> {
        self.write(state).map(|_| ())
    }
}
