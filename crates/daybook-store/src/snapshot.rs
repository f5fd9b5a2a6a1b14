//! Key-value snapshot persistence.
//!
//! Conversation state survives process restarts as an opaque serialized
//! blob under a fixed key. The store neither inspects nor versions the
//! payload; consumers are responsible for discarding shapes they no longer
//! understand.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rusqlite::OptionalExtension;

use daybook_core::error::{DaybookError, Result};
use daybook_core::types::Timestamp;

use crate::db::Database;

/// Minimal key-value persistence for serialized state blobs.
pub trait SnapshotStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Load the value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Remove the value stored under `key`. Missing keys are not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// SQLite-backed snapshot store over the `snapshots` table.
pub struct SqliteSnapshots {
    db: Arc<Database>,
}

impl SqliteSnapshots {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl SnapshotStore for SqliteSnapshots {
    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO snapshots (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3",
                rusqlite::params![key, value, Timestamp::now().0],
            )
            .map_err(|e| DaybookError::Snapshot(format!("Failed to save snapshot: {}", e)))?;
            Ok(())
        })
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM snapshots WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DaybookError::Snapshot(format!("Failed to load snapshot: {}", e)))
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM snapshots WHERE key = ?1",
                rusqlite::params![key],
            )
            .map_err(|e| DaybookError::Snapshot(format!("Failed to delete snapshot: {}", e)))?;
            Ok(())
        })
    }
}

/// In-memory snapshot store for tests and ephemeral sessions.
pub struct MemorySnapshots {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemorySnapshots {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for MemorySnapshots {
    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|e| DaybookError::Snapshot(format!("Lock poisoned: {}", e)))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .lock()
            .map_err(|e| DaybookError::Snapshot(format!("Lock poisoned: {}", e)))?
            .get(key)
            .cloned())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|e| DaybookError::Snapshot(format!("Lock poisoned: {}", e)))?
            .remove(key);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
