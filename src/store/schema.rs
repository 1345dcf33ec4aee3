//! Table layout and connection pragmas

use rusqlite::Connection;

use crate::error::GraphResult;

/// Pragmas applied to every connection.
///
/// Foreign keys stay off: relationships may point at resources that were
/// never part of a run.
pub fn apply_pragmas(conn: &Connection) -> GraphResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = OFF;
        ",
    )?;
    Ok(())
}

pub fn create_schema(conn: &Connection) -> GraphResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS resources (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            analysis_run_id     TEXT NOT NULL,
            uid                 TEXT NOT NULL UNIQUE,
            name                TEXT NOT NULL,
            namespace           TEXT,
            kind                TEXT NOT NULL,
            api_version         TEXT NOT NULL,
            health_status       TEXT NOT NULL,
            issues              TEXT NOT NULL DEFAULT '[]',
            labels              TEXT NOT NULL DEFAULT '{}',
            annotations         TEXT NOT NULL DEFAULT '{}',
            spec                TEXT NOT NULL DEFAULT '{}',
            status              TEXT,
            creation_timestamp  TEXT,
            deletion_timestamp  TEXT,
            resource_version    TEXT,
            owner_references    TEXT NOT NULL DEFAULT '[]',
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_resources_kind ON resources(kind);
        CREATE INDEX IF NOT EXISTS idx_resources_namespace ON resources(namespace);
        CREATE INDEX IF NOT EXISTS idx_resources_health ON resources(health_status);
        CREATE INDEX IF NOT EXISTS idx_resources_created ON resources(creation_timestamp);
        CREATE INDEX IF NOT EXISTS idx_resources_run ON resources(analysis_run_id);

        CREATE TABLE IF NOT EXISTS relationships (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            analysis_run_id     TEXT NOT NULL,
            source_uid          TEXT NOT NULL,
            source_kind         TEXT NOT NULL,
            source_name         TEXT NOT NULL,
            source_namespace    TEXT,
            target_uid          TEXT,
            target_kind         TEXT NOT NULL,
            target_name         TEXT NOT NULL,
            target_namespace    TEXT,
            relationship_type   TEXT NOT NULL,
            direction           TEXT NOT NULL,
            strength            REAL NOT NULL DEFAULT 1.0,
            metadata            TEXT NOT NULL DEFAULT '{}',
            created_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_relationships_source ON relationships(source_uid);
        CREATE INDEX IF NOT EXISTS idx_relationships_target
            ON relationships(target_kind, target_name, target_namespace);
        CREATE INDEX IF NOT EXISTS idx_relationships_type ON relationships(relationship_type);
        CREATE INDEX IF NOT EXISTS idx_relationships_run ON relationships(analysis_run_id);

        CREATE TABLE IF NOT EXISTS resource_health_history (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            resource_uid        TEXT NOT NULL,
            health_status       TEXT NOT NULL,
            issues              TEXT NOT NULL DEFAULT '[]',
            timestamp           TEXT NOT NULL,
            analysis_run_id     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_health_history_uid ON resource_health_history(resource_uid);
        CREATE INDEX IF NOT EXISTS idx_health_history_timestamp ON resource_health_history(timestamp);

        CREATE TABLE IF NOT EXISTS analysis_summary (
            id                          INTEGER PRIMARY KEY AUTOINCREMENT,
            analysis_run_id             TEXT NOT NULL,
            analysis_timestamp          TEXT NOT NULL,
            analysis_duration_seconds   REAL NOT NULL,
            total_resources             INTEGER NOT NULL,
            total_relationships         INTEGER NOT NULL,
            unresolved_relationships    INTEGER NOT NULL DEFAULT 0,
            issues_count                INTEGER NOT NULL DEFAULT 0,
            health_summary              TEXT NOT NULL DEFAULT '{}',
            resource_types              TEXT NOT NULL DEFAULT '{}',
            namespace_summary           TEXT NOT NULL DEFAULT '{}',
            relationship_types          TEXT NOT NULL DEFAULT '{}'
        );

        CREATE INDEX IF NOT EXISTS idx_summary_run ON analysis_summary(analysis_run_id);
        ",
    )?;
    Ok(())
}
