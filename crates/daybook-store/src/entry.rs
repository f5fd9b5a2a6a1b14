//! The persistent entry record.

use daybook_core::types::{ItemKind, Priority, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A committed item in the knowledge store.
///
/// Journal entries carry append-merge semantics keyed by calendar day; all
/// other kinds are one record per committed proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub kind: ItemKind,
    pub title: String,
    pub content: String,
    pub when: Option<Timestamp>,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Entry {
    /// Create a new open entry stamped with `now`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: ItemKind,
        title: String,
        content: String,
        when: Option<Timestamp>,
        tags: Vec<String>,
        priority: Priority,
        now: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title,
            content,
            when,
            tags,
            priority,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}
