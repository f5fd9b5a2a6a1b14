//! Commit engine: promotes accepted proposals into persistent entries.
//!
//! Journal proposals merge into the day's journal record instead of creating
//! a new one. Batches are best-effort: a failed write is logged and skipped,
//! entries already written stay written, and the outcome counts successes
//! only.

use tracing::{info, warn};

use daybook_core::types::{ItemKind, Timestamp};
use daybook_store::{Entry, EntryStore};

use crate::types::{ActionProposal, CommitOutcome};

/// Applies accepted proposals to the entry store.
pub struct CommitEngine;

impl CommitEngine {
    pub fn new() -> Self {
        Self
    }

    /// Commit a batch of proposals with `now` as the reference timestamp.
    pub fn commit(
        &self,
        store: &dyn EntryStore,
        proposals: &[ActionProposal],
        now: Timestamp,
    ) -> CommitOutcome {
        let mut outcome = CommitOutcome::default();

        for proposal in proposals {
            match proposal.kind {
                ItemKind::Journal => match self.commit_journal(store, proposal, now) {
                    Ok(()) => outcome.diary_updated += 1,
                    Err(e) => warn!("Journal commit failed, skipping: {}", e),
                },
                _ => match store.insert(to_entry(proposal, now)) {
                    Ok(()) => outcome.created += 1,
                    Err(e) => warn!("Entry commit failed, skipping: {}", e),
                },
            }
        }

        info!(
            created = outcome.created,
            diary_updated = outcome.diary_updated,
            "Committed proposal batch"
        );
        outcome
    }

    /// Locate or create the day's journal record and append the content.
    fn commit_journal(
        &self,
        store: &dyn EntryStore,
        proposal: &ActionProposal,
        now: Timestamp,
    ) -> daybook_core::error::Result<()> {
        let day = now.local_date();
        match store.journal_for_day(day)? {
            Some(existing) => store.append_journal(existing.id, &proposal.content, now),
            None => {
                let title = if proposal.title.is_empty() {
                    day.format("%Y-%m-%d").to_string()
                } else {
                    proposal.title.clone()
                };
                store.insert(Entry::new(
                    ItemKind::Journal,
                    title,
                    proposal.content.clone(),
                    None,
                    proposal.tags.clone(),
                    proposal.priority,
                    now,
                ))
            }
        }
    }
}

impl Default for CommitEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn to_entry(proposal: &ActionProposal, now: Timestamp) -> Entry {
    Entry::new(
        proposal.kind,
        proposal.title.clone(),
        proposal.content.clone(),
        proposal.when,
        proposal.tags.clone(),
        proposal.priority,
        now,
    )
}

// =============================================================================
// Tests
// =============================================================================
