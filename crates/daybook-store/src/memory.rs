//! In-memory entry store.
//!
//! Backs tests and ephemeral sessions; the SQLite store in
//! [`crate::repository`] is the durable implementation.

use std::sync::Mutex;

use chrono::NaiveDate;
use daybook_core::error::{DaybookError, Result};
use daybook_core::types::{ItemKind, Timestamp};
use uuid::Uuid;

use crate::entry::Entry;
use crate::store::EntryStore;

/// Entry store held entirely in memory.
pub struct MemoryStore {
    entries: Mutex<Vec<Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Entry>>> {
        self.entries
            .lock()
            .map_err(|e| DaybookError::Storage(format!("Lock poisoned: {}", e)))
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore for MemoryStore {
    fn insert(&self, entry: Entry) -> Result<()> {
        self.lock()?.push(entry);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Entry>> {
        Ok(self.lock()?.iter().find(|e| e.id == id).cloned())
    }

    fn list_open(&self, limit: usize) -> Result<Vec<Entry>> {
        let entries = self.lock()?;
        let mut open: Vec<Entry> = entries
            .iter()
            .filter(|e| {
                !e.completed && matches!(e.kind, ItemKind::Todo | ItemKind::Reminder)
            })
            .cloned()
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        open.truncate(limit);
        Ok(open)
    }

    fn list_recent(&self, kind: ItemKind, limit: usize) -> Result<Vec<Entry>> {
        let entries = self.lock()?;
        let mut matching: Vec<Entry> = entries
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        Ok(matching)
    }

    fn journal_for_day(&self, day: NaiveDate) -> Result<Option<Entry>> {
        Ok(self
            .lock()?
            .iter()
            .find(|e| e.kind == ItemKind::Journal && e.created_at.local_date() == day)
            .cloned())
    }

    fn append_journal(&self, id: Uuid, text: &str, now: Timestamp) -> Result<()> {
        let mut entries = self.lock()?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DaybookError::Storage(format!("Entry not found: {}", id)))?;
        if !entry.content.is_empty() {
            entry.content.push_str("\n\n");
        }
        entry.content.push_str(text);
        entry.updated_at = now;
        Ok(())
    }

    fn set_completed(&self, id: Uuid, completed: bool, now: Timestamp) -> Result<()> {
        let mut entries = self.lock()?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DaybookError::Storage(format!("Entry not found: {}", id)))?;
        entry.completed = completed;
        entry.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
