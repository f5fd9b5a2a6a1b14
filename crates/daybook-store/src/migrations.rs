//! Database schema migrations.
//!
//! Applies the initial schema: the entries table, the snapshots key-value
//! table, and the schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use daybook_core::error::DaybookError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental
/// changes.
pub fn run_migrations(conn: &Connection) -> Result<(), DaybookError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| DaybookError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| DaybookError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), DaybookError> {
    conn.execute_batch(
        "
        -- Committed items (todos, reminders, notes, journal days).
        CREATE TABLE IF NOT EXISTS entries (
            id          TEXT PRIMARY KEY NOT NULL,
            kind        TEXT NOT NULL
                        CHECK (kind IN ('todo', 'reminder', 'note', 'journal')),
            title       TEXT NOT NULL DEFAULT '',
            content     TEXT NOT NULL DEFAULT '',
            due_at      INTEGER,
            tags        TEXT NOT NULL DEFAULT '[]',
            priority    TEXT NOT NULL,
            completed   INTEGER NOT NULL DEFAULT 0,
            created_at  INTEGER NOT NULL,
            updated_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_kind_created
            ON entries (kind, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_entries_completed
            ON entries (completed);

        -- Key-value snapshots (serialized conversation state).
        CREATE TABLE IF NOT EXISTS snapshots (
            key         TEXT PRIMARY KEY NOT NULL,
            value       TEXT NOT NULL,
            updated_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| DaybookError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}
