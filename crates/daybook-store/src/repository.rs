//! SQLite-backed entry store.
//!
//! Implements [`EntryStore`] over the [`Database`] wrapper using raw SQL.
//! Tags are stored as a JSON text column.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use daybook_core::error::{DaybookError, Result};
use daybook_core::types::{ItemKind, Priority, Timestamp};

use crate::db::Database;
use crate::entry::Entry;
use crate::store::EntryStore;

const ENTRY_COLUMNS: &str =
    "id, kind, title, content, due_at, tags, priority, completed, created_at, updated_at";

/// Durable entry store over SQLite.
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl EntryStore for SqliteStore {
    fn insert(&self, entry: Entry) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO entries (id, kind, title, content, due_at, tags, priority,
                                      completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    entry.id.to_string(),
                    entry.kind.to_string(),
                    entry.title,
                    entry.content,
                    entry.when.map(|t| t.0),
                    serde_json::to_string(&entry.tags)?,
                    entry.priority.to_string(),
                    entry.completed as i32,
                    entry.created_at.0,
                    entry.updated_at.0,
                ],
            )
            .map_err(|e| DaybookError::Storage(format!("Failed to insert entry: {}", e)))?;
            Ok(())
        })
    }

    fn get(&self, id: Uuid) -> Result<Option<Entry>> {
        self.db.with_conn(|conn| {
            let sql = format!("SELECT {} FROM entries WHERE id = ?1", ENTRY_COLUMNS);
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| DaybookError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![id.to_string()], |row| {
                    Ok(row_to_entry(row))
                })
                .optional()
                .map_err(|e| DaybookError::Storage(e.to_string()))?;

            match result {
                Some(entry) => Ok(Some(entry?)),
                None => Ok(None),
            }
        })
    }

    fn list_open(&self, limit: usize) -> Result<Vec<Entry>> {
        self.db.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM entries
                 WHERE completed = 0 AND kind IN ('todo', 'reminder')
                 ORDER BY created_at DESC
                 LIMIT ?1",
                ENTRY_COLUMNS
            );
            query_entries(conn, &sql, rusqlite::params![limit as i64])
        })
    }

    fn list_recent(&self, kind: ItemKind, limit: usize) -> Result<Vec<Entry>> {
        self.db.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM entries
                 WHERE kind = ?1
                 ORDER BY created_at DESC
                 LIMIT ?2",
                ENTRY_COLUMNS
            );
            query_entries(
                conn,
                &sql,
                rusqlite::params![kind.to_string(), limit as i64],
            )
        })
    }

    fn journal_for_day(&self, day: NaiveDate) -> Result<Option<Entry>> {
        let start = Timestamp::from_local(day, NaiveTime::MIN);
        let end = match day.succ_opt() {
            Some(next) => Timestamp::from_local(next, NaiveTime::MIN),
            None => Timestamp(i64::MAX),
        };

        self.db.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM entries
                 WHERE kind = 'journal' AND created_at >= ?1 AND created_at < ?2
                 ORDER BY created_at ASC
                 LIMIT 1",
                ENTRY_COLUMNS
            );
            let entries = query_entries(conn, &sql, rusqlite::params![start.0, end.0])?;
            Ok(entries.into_iter().next())
        })
    }

    fn append_journal(&self, id: Uuid, text: &str, now: Timestamp) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE entries
                     SET content = CASE
                            WHEN content = '' THEN ?2
                            ELSE content || char(10) || char(10) || ?2
                         END,
                         updated_at = ?3
                     WHERE id = ?1",
                    rusqlite::params![id.to_string(), text, now.0],
                )
                .map_err(|e| DaybookError::Storage(format!("Failed to append journal: {}", e)))?;
            if changed == 0 {
                return Err(DaybookError::Storage(format!("Entry not found: {}", id)));
            }
            Ok(())
        })
    }

    fn set_completed(&self, id: Uuid, completed: bool, now: Timestamp) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE entries SET completed = ?2, updated_at = ?3 WHERE id = ?1",
                    rusqlite::params![id.to_string(), completed as i32, now.0],
                )
                .map_err(|e| DaybookError::Storage(format!("Failed to update entry: {}", e)))?;
            if changed == 0 {
                return Err(DaybookError::Storage(format!("Entry not found: {}", id)));
            }
            Ok(())
        })
    }
}

fn query_entries(
    conn: &rusqlite::Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Entry>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;

    let rows = stmt
        .query_map(params, |row| Ok(row_to_entry(row)))
        .map_err(|e| DaybookError::Storage(e.to_string()))?;

    let mut entries = Vec::new();
    for row in rows {
        let entry = row.map_err(|e| DaybookError::Storage(e.to_string()))??;
        entries.push(entry);
    }
    Ok(entries)
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<Entry> {
    let id: String = row
        .get(0)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;
    let kind: String = row
        .get(1)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;
    let title: String = row
        .get(2)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;
    let content: String = row
        .get(3)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;
    let due_at: Option<i64> = row
        .get(4)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;
    let tags: String = row
        .get(5)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;
    let priority: String = row
        .get(6)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;
    let completed: i32 = row
        .get(7)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;
    let created_at: i64 = row
        .get(8)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;
    let updated_at: i64 = row
        .get(9)
        .map_err(|e| DaybookError::Storage(e.to_string()))?;

    Ok(Entry {
        id: Uuid::parse_str(&id)
            .map_err(|e| DaybookError::Storage(format!("Bad entry id: {}", e)))?,
        kind: kind
            .parse::<ItemKind>()
            .map_err(DaybookError::Storage)?,
        title,
        content,
        when: due_at.map(Timestamp),
        tags: serde_json::from_str(&tags)?,
        priority: priority.parse::<Priority>().map_err(DaybookError::Storage)?,
        completed: completed != 0,
        created_at: Timestamp(created_at),
        updated_at: Timestamp(updated_at),
    })
}

// =============================================================================
// Tests
// =============================================================================
