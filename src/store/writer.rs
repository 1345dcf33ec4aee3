//! Writes one analyzed run (or batch) inside a single transaction
//!
//! Either every row of the call is visible afterwards or none is. History
//! and summary rows are only ever appended.

use rusqlite::{Connection, Transaction, params};
use serde::Serialize;

use crate::error::GraphResult;
use crate::models::{ClusterState, HealthVerdict, NormalizedResource, ResourceRelationship};

/// Row counts written by one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub resources: usize,
    pub relationships: usize,
    pub history: usize,
    pub replaced_resources: usize,
    pub replaced_relationships: usize,
}

pub fn write_state(
    conn: &mut Connection,
    state: &ClusterState,
    replace_existing: bool,
) -> GraphResult<WriteStats> {
    let tx = conn.transaction()?;
    let mut stats = WriteStats::default();

    if replace_existing {
        stats.replaced_relationships = tx.execute(
            "DELETE FROM relationships WHERE analysis_run_id != ?1",
            params![state.run_id],
        )?;
        stats.replaced_resources = tx.execute(
            "DELETE FROM resources WHERE analysis_run_id != ?1",
            params![state.run_id],
        )?;
    }

    let now = state.run_timestamp.to_rfc3339();
    let unknown = HealthVerdict::unknown();
    for resource in &state.resources {
        let verdict = state.health_of(resource).unwrap_or(&unknown);
        insert_resource(&tx, &state.run_id, resource, verdict, &now)?;
        insert_history(&tx, &state.run_id, resource, verdict, &now)?;
        stats.resources += 1;
        stats.history += 1;
    }

    for relationship in &state.relationships {
        insert_relationship(&tx, &state.run_id, relationship, &now)?;
        stats.relationships += 1;
    }

    insert_summary(&tx, state)?;
    tx.commit()?;

    tracing::info!(
        run_id = %state.run_id,
        resources = stats.resources,
        relationships = stats.relationships,
        "Persisted analysis run"
    );
    if stats.replaced_resources > 0 {
        tracing::debug!(
            "Replaced {} resource(s) and {} relationship(s) from earlier runs",
            stats.replaced_resources,
            stats.replaced_relationships
        );
    }
    Ok(stats)
}

fn json<T: Serialize + ?Sized>(value: &T) -> GraphResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn insert_resource(
    tx: &Transaction<'_>,
    run_id: &str,
    resource: &NormalizedResource,
    verdict: &HealthVerdict,
    now: &str,
) -> GraphResult<()> {
    let status = resource.status.as_ref().map(json).transpose()?;
    tx.execute(
        "INSERT INTO resources (
            analysis_run_id, uid, name, namespace, kind, api_version,
            health_status, issues, labels, annotations, spec, status,
            creation_timestamp, deletion_timestamp, resource_version,
            owner_references, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)
         ON CONFLICT(uid) DO UPDATE SET
            analysis_run_id = excluded.analysis_run_id,
            name = excluded.name,
            namespace = excluded.namespace,
            kind = excluded.kind,
            api_version = excluded.api_version,
            health_status = excluded.health_status,
            issues = excluded.issues,
            labels = excluded.labels,
            annotations = excluded.annotations,
            spec = excluded.spec,
            status = excluded.status,
            creation_timestamp = excluded.creation_timestamp,
            deletion_timestamp = excluded.deletion_timestamp,
            resource_version = excluded.resource_version,
            owner_references = excluded.owner_references,
            updated_at = excluded.updated_at",
        params![
            run_id,
            resource.identity(),
            resource.name,
            resource.namespace,
            resource.kind,
            resource.api_version,
            verdict.status.as_str(),
            json(&verdict.issues)?,
            json(&resource.labels)?,
            json(&resource.annotations)?,
            json(&resource.spec)?,
            status,
            resource.creation_timestamp.map(|ts| ts.to_rfc3339()),
            resource.deletion_timestamp.map(|ts| ts.to_rfc3339()),
            resource.resource_version,
            json(&resource.owner_references)?,
            now,
        ],
    )?;
    Ok(())
}

fn insert_history(
    tx: &Transaction<'_>,
    run_id: &str,
    resource: &NormalizedResource,
    verdict: &HealthVerdict,
    now: &str,
) -> GraphResult<()> {
    tx.execute(
        "INSERT INTO resource_health_history
            (resource_uid, health_status, issues, timestamp, analysis_run_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            resource.identity(),
            verdict.status.as_str(),
            json(&verdict.issues)?,
            now,
            run_id,
        ],
    )?;
    Ok(())
}

fn insert_relationship(
    tx: &Transaction<'_>,
    run_id: &str,
    relationship: &ResourceRelationship,
    now: &str,
) -> GraphResult<()> {
    let source = &relationship.source;
    let target = &relationship.target;
    // Dangling targets without a UID have no stable identity to traverse to
    let target_uid = target
        .uid
        .clone()
        .or_else(|| (!relationship.is_unresolved()).then(|| target.identity()));

    tx.execute(
        "INSERT INTO relationships (
            analysis_run_id, source_uid, source_kind, source_name, source_namespace,
            target_uid, target_kind, target_name, target_namespace,
            relationship_type, direction, strength, metadata, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            run_id,
            source.identity(),
            source.kind,
            source.name,
            source.namespace,
            target_uid,
            target.kind,
            target.name,
            target.namespace,
            relationship.kind.as_str(),
            relationship.direction.as_str(),
            relationship.strength,
            json(&relationship.metadata)?,
            now,
        ],
    )?;
    Ok(())
}

fn insert_summary(tx: &Transaction<'_>, state: &ClusterState) -> GraphResult<()> {
    let summary = &state.summary;
    tx.execute(
        "INSERT INTO analysis_summary (
            analysis_run_id, analysis_timestamp, analysis_duration_seconds,
            total_resources, total_relationships, unresolved_relationships, issues_count,
            health_summary, resource_types, namespace_summary, relationship_types
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            state.run_id,
            state.run_timestamp.to_rfc3339(),
            summary.analysis_duration_seconds,
            summary.total_resources as i64,
            summary.total_relationships as i64,
            summary.unresolved_relationships as i64,
            summary.issues_count as i64,
            json(&summary.health_status)?,
            json(&summary.resource_types)?,
            json(&summary.namespaces)?,
            json(&summary.relationship_types)?,
        ],
    )?;
    Ok(())
}
