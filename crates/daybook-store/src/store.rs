//! The narrow store interface the extraction engine consumes.

use chrono::NaiveDate;
use daybook_core::error::Result;
use daybook_core::types::{ItemKind, Timestamp};
use uuid::Uuid;

use crate::entry::Entry;

/// Committed-entry store boundary.
///
/// The extraction engine only writes through `insert` and the journal
/// append pair, and reads through the listing methods when building the
/// grounding digest. Implementations must make each individual write
/// atomic; batch atomicity across entries is not required.
pub trait EntryStore: Send + Sync {
    /// Insert a new entry.
    fn insert(&self, entry: Entry) -> Result<()>;

    /// Fetch an entry by ID.
    fn get(&self, id: Uuid) -> Result<Option<Entry>>;

    /// Open (not completed) todos and reminders, newest first.
    fn list_open(&self, limit: usize) -> Result<Vec<Entry>>;

    /// Most recent entries of the given kind, newest first.
    fn list_recent(&self, kind: ItemKind, limit: usize) -> Result<Vec<Entry>>;

    /// The journal entry for the given local calendar day, if one exists.
    fn journal_for_day(&self, day: NaiveDate) -> Result<Option<Entry>>;

    /// Append text to an existing journal entry, separated by a blank line.
    fn append_journal(&self, id: Uuid, text: &str, now: Timestamp) -> Result<()>;

    /// Flip the completion flag on an entry.
    fn set_completed(&self, id: Uuid, completed: bool, now: Timestamp) -> Result<()>;
}
