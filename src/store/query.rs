//! Read-only queries over persisted runs

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::str::FromStr;

use rusqlite::types::{ToSql, Type};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::GraphResult;
use crate::models::{Direction, HealthStatus, RelationshipKind, StringMap};

/// Filters for [`query_resources`]; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub kind: Option<String>,
    pub namespace: Option<String>,
    pub health_status: Option<HealthStatus>,
    pub has_issues: Option<bool>,
}

/// Filters for [`query_relationships`]
#[derive(Debug, Clone, Default)]
pub struct RelationshipFilter {
    pub source_kind: Option<String>,
    pub target_kind: Option<String>,
    pub relationship_type: Option<RelationshipKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredResource {
    pub uid: String,
    pub name: String,
    pub namespace: Option<String>,
    pub kind: String,
    pub api_version: String,
    pub health_status: HealthStatus,
    pub issues: Vec<String>,
    pub labels: StringMap,
    pub creation_timestamp: Option<String>,
    pub analysis_run_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRelationship {
    pub id: i64,
    pub source_uid: String,
    pub source_kind: String,
    pub source_name: String,
    pub source_namespace: Option<String>,
    pub target_uid: Option<String>,
    pub target_kind: String,
    pub target_name: String,
    pub target_namespace: Option<String>,
    pub relationship_type: RelationshipKind,
    pub direction: Direction,
    pub strength: f64,
    pub metadata: Value,
    pub analysis_run_id: String,
}

/// A relationship reached during traversal, with its hop count from the start
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraversalStep {
    pub depth: usize,
    pub relationship: StoredRelationship,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthSummary {
    pub health_status: BTreeMap<String, usize>,
    pub resources_with_issues: usize,
    pub namespace_distribution: BTreeMap<String, usize>,
    pub resource_type_distribution: BTreeMap<String, usize>,
    pub total_resources: usize,
    pub total_relationships: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthRecord {
    pub health_status: HealthStatus,
    pub issues: Vec<String>,
    pub timestamp: String,
    pub analysis_run_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSummary {
    pub analysis_run_id: String,
    pub analysis_timestamp: String,
    pub analysis_duration_seconds: f64,
    pub total_resources: usize,
    pub total_relationships: usize,
    pub unresolved_relationships: usize,
    pub issues_count: usize,
    pub health_summary: BTreeMap<String, usize>,
    pub resource_types: BTreeMap<String, usize>,
    pub namespace_summary: BTreeMap<String, usize>,
    pub relationship_types: BTreeMap<String, usize>,
}

/// One analysis run as recorded in `analysis_summary`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    pub analysis_run_id: String,
    pub analysis_timestamp: String,
    pub batches: usize,
    pub total_resources: usize,
    pub total_relationships: usize,
}

const RESOURCE_COLUMNS: &str = "uid, name, namespace, kind, api_version, health_status, issues, \
                                labels, creation_timestamp, analysis_run_id";

const RELATIONSHIP_COLUMNS: &str = "id, source_uid, source_kind, source_name, source_namespace, \
                                    target_uid, target_kind, target_name, target_namespace, \
                                    relationship_type, direction, strength, metadata, analysis_run_id";

fn conversion_error(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into())
}

fn parse_column<T: FromStr<Err = String>>(row: &Row<'_>, index: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(index)?;
    raw.parse().map_err(|e: String| conversion_error(index, e))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, index: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(index)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(index, e.to_string()))
}

fn count_column(row: &Row<'_>, index: usize) -> rusqlite::Result<usize> {
    Ok(row.get::<_, i64>(index)?.max(0) as usize)
}

fn resource_from_row(row: &Row<'_>) -> rusqlite::Result<StoredResource> {
    Ok(StoredResource {
        uid: row.get(0)?,
        name: row.get(1)?,
        namespace: row.get(2)?,
        kind: row.get(3)?,
        api_version: row.get(4)?,
        health_status: parse_column(row, 5)?,
        issues: json_column(row, 6)?,
        labels: json_column(row, 7)?,
        creation_timestamp: row.get(8)?,
        analysis_run_id: row.get(9)?,
    })
}

fn relationship_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRelationship> {
    Ok(StoredRelationship {
        id: row.get(0)?,
        source_uid: row.get(1)?,
        source_kind: row.get(2)?,
        source_name: row.get(3)?,
        source_namespace: row.get(4)?,
        target_uid: row.get(5)?,
        target_kind: row.get(6)?,
        target_name: row.get(7)?,
        target_namespace: row.get(8)?,
        relationship_type: parse_column(row, 9)?,
        direction: parse_column(row, 10)?,
        strength: row.get(11)?,
        metadata: json_column(row, 12)?,
        analysis_run_id: row.get(13)?,
    })
}

/// Run `sql` with boxed parameters and collect the mapped rows
fn collect_rows<T>(
    conn: &Connection,
    sql: &str,
    params_vec: &[Box<dyn ToSql>],
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> GraphResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), map)?;
    Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
}

/// Resources matching `filter`, ordered by namespace, kind and name
pub fn query_resources(conn: &Connection, filter: &ResourceFilter) -> GraphResult<Vec<StoredResource>> {
    let mut sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE 1=1");
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(kind) = &filter.kind {
        params_vec.push(Box::new(kind.clone()));
        sql.push_str(&format!(" AND kind = ?{}", params_vec.len()));
    }
    if let Some(namespace) = &filter.namespace {
        params_vec.push(Box::new(namespace.clone()));
        sql.push_str(&format!(" AND namespace = ?{}", params_vec.len()));
    }
    if let Some(status) = filter.health_status {
        params_vec.push(Box::new(status.as_str()));
        sql.push_str(&format!(" AND health_status = ?{}", params_vec.len()));
    }
    match filter.has_issues {
        Some(true) => sql.push_str(" AND issues != '[]'"),
        Some(false) => sql.push_str(" AND issues = '[]'"),
        None => {}
    }
    sql.push_str(" ORDER BY namespace, kind, name");

    collect_rows(conn, &sql, &params_vec, resource_from_row)
}

/// Relationships matching `filter`, ordered by source kind, source name and type
pub fn query_relationships(
    conn: &Connection,
    filter: &RelationshipFilter,
) -> GraphResult<Vec<StoredRelationship>> {
    let mut sql = format!("SELECT {RELATIONSHIP_COLUMNS} FROM relationships WHERE 1=1");
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(kind) = &filter.source_kind {
        params_vec.push(Box::new(kind.clone()));
        sql.push_str(&format!(" AND source_kind = ?{}", params_vec.len()));
    }
    if let Some(kind) = &filter.target_kind {
        params_vec.push(Box::new(kind.clone()));
        sql.push_str(&format!(" AND target_kind = ?{}", params_vec.len()));
    }
    if let Some(kind) = filter.relationship_type {
        params_vec.push(Box::new(kind.as_str()));
        sql.push_str(&format!(" AND relationship_type = ?{}", params_vec.len()));
    }
    sql.push_str(" ORDER BY source_kind, source_name, relationship_type, id");

    collect_rows(conn, &sql, &params_vec, relationship_from_row)
}

/// Outgoing relationships of one resource
pub fn relationships_from(conn: &Connection, source_uid: &str) -> GraphResult<Vec<StoredRelationship>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELATIONSHIP_COLUMNS} FROM relationships WHERE source_uid = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![source_uid], relationship_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Incoming relationships of the resource named by `(kind, name, namespace)`
pub fn relationships_to(
    conn: &Connection,
    target_kind: &str,
    target_name: &str,
    target_namespace: Option<&str>,
) -> GraphResult<Vec<StoredRelationship>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELATIONSHIP_COLUMNS} FROM relationships
         WHERE target_kind = ?1 AND target_name = ?2 AND target_namespace IS ?3
         ORDER BY id"
    ))?;
    let rows = stmt.query_map(
        params![target_kind, target_name, target_namespace],
        relationship_from_row,
    )?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Breadth-first walk of outgoing relationships from `source_uid`.
///
/// Depth 1 returns the direct relationships. Each resource is expanded at
/// most once, so cycles terminate. Targets without a stored UID are leaves.
pub fn traverse(conn: &Connection, source_uid: &str, max_depth: usize) -> GraphResult<Vec<TraversalStep>> {
    let mut steps = Vec::new();
    let mut visited: HashSet<String> = HashSet::from([source_uid.to_string()]);
    let mut queue: VecDeque<(String, usize)> = VecDeque::from([(source_uid.to_string(), 0)]);

    while let Some((uid, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for relationship in relationships_from(conn, &uid)? {
            if let Some(next) = &relationship.target_uid {
                if visited.insert(next.clone()) {
                    queue.push_back((next.clone(), depth + 1));
                }
            }
            steps.push(TraversalStep {
                depth: depth + 1,
                relationship,
            });
        }
    }

    Ok(steps)
}

/// Counts over the currently stored resources
pub fn health_summary(conn: &Connection) -> GraphResult<HealthSummary> {
    let grouped = |sql: &str| -> GraphResult<BTreeMap<String, usize>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, count_column(row, 1)?)))?;
        Ok(rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()?)
    };

    let health_status =
        grouped("SELECT health_status, COUNT(*) FROM resources GROUP BY health_status")?;
    let namespace_distribution = grouped(
        "SELECT namespace, COUNT(*) FROM resources WHERE namespace IS NOT NULL GROUP BY namespace",
    )?;
    let resource_type_distribution = grouped("SELECT kind, COUNT(*) FROM resources GROUP BY kind")?;

    let resources_with_issues = conn.query_row(
        "SELECT COUNT(*) FROM resources WHERE issues != '[]'",
        [],
        |row| count_column(row, 0),
    )?;
    let total_relationships =
        conn.query_row("SELECT COUNT(*) FROM relationships", [], |row| count_column(row, 0))?;

    Ok(HealthSummary {
        total_resources: health_status.values().sum(),
        health_status,
        resources_with_issues,
        namespace_distribution,
        resource_type_distribution,
        total_relationships,
    })
}

/// Every recorded verdict of one resource, oldest first
pub fn health_history(conn: &Connection, resource_uid: &str) -> GraphResult<Vec<HealthRecord>> {
    let mut stmt = conn.prepare(
        "SELECT health_status, issues, timestamp, analysis_run_id
         FROM resource_health_history
         WHERE resource_uid = ?1
         ORDER BY id",
    )?;
    let rows = stmt.query_map(params![resource_uid], |row| {
        Ok(HealthRecord {
            health_status: parse_column(row, 0)?,
            issues: json_column(row, 1)?,
            timestamp: row.get(2)?,
            analysis_run_id: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Most recently written summary row
pub fn latest_summary(conn: &Connection) -> GraphResult<Option<StoredSummary>> {
    let summary = conn
        .query_row(
            "SELECT analysis_run_id, analysis_timestamp, analysis_duration_seconds,
                    total_resources, total_relationships, unresolved_relationships, issues_count,
                    health_summary, resource_types, namespace_summary, relationship_types
             FROM analysis_summary
             ORDER BY id DESC
             LIMIT 1",
            [],
            |row| {
                Ok(StoredSummary {
                    analysis_run_id: row.get(0)?,
                    analysis_timestamp: row.get(1)?,
                    analysis_duration_seconds: row.get(2)?,
                    total_resources: count_column(row, 3)?,
                    total_relationships: count_column(row, 4)?,
                    unresolved_relationships: count_column(row, 5)?,
                    issues_count: count_column(row, 6)?,
                    health_summary: json_column(row, 7)?,
                    resource_types: json_column(row, 8)?,
                    namespace_summary: json_column(row, 9)?,
                    relationship_types: json_column(row, 10)?,
                })
            },
        )
        .optional()?;
    Ok(summary)
}

/// Recorded runs, newest first. Commit chunks of one run are folded together;
/// each chunk row carries the totals of the whole run.
pub fn list_runs(conn: &Connection) -> GraphResult<Vec<RunRecord>> {
    let mut stmt = conn.prepare(
        "SELECT analysis_run_id, MIN(analysis_timestamp), COUNT(*),
                MAX(total_resources), MAX(total_relationships), MAX(id) AS last_id
         FROM analysis_summary
         GROUP BY analysis_run_id
         ORDER BY last_id DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(RunRecord {
            analysis_run_id: row.get(0)?,
            analysis_timestamp: row.get(1)?,
            batches: count_column(row, 2)?,
            total_resources: count_column(row, 3)?,
            total_relationships: count_column(row, 4)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
