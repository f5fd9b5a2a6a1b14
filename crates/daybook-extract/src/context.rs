//! Context digest for grounding the classifier.
//!
//! Produces a compact textual summary of the current store contents: counts
//! and highlights of open todos and reminders plus the most recent notes.
//! Store failures degrade the digest instead of failing the send.

use tracing::warn;

use daybook_core::config::SummaryConfig;
use daybook_core::types::ItemKind;
use daybook_store::{Entry, EntryStore};

/// Builds the grounding digest handed to the classifier.
pub struct ContextSummarizer {
    max_highlights: usize,
    recent_notes: usize,
}

impl ContextSummarizer {
    pub fn new(config: &SummaryConfig) -> Self {
        Self {
            max_highlights: config.max_highlights,
            recent_notes: config.recent_notes,
        }
    }

    /// Summarize the store into a bounded digest.
    ///
    /// Never fails: an unreadable store yields whatever sections could be
    /// built, possibly the empty string.
    pub fn summarize(&self, store: &dyn EntryStore) -> String {
        let mut sections: Vec<String> = Vec::new();

        match store.list_open(self.max_highlights * 2) {
            Ok(open) => {
                let todos: Vec<&Entry> =
                    open.iter().filter(|e| e.kind == ItemKind::Todo).collect();
                let reminders: Vec<&Entry> = open
                    .iter()
                    .filter(|e| e.kind == ItemKind::Reminder)
                    .collect();
                if !todos.is_empty() {
                    sections.push(section("Open todos", &todos, self.max_highlights));
                }
                if !reminders.is_empty() {
                    sections.push(section("Open reminders", &reminders, self.max_highlights));
                }
            }
            Err(e) => warn!("Context summary: open items unavailable: {}", e),
        }

        match store.list_recent(ItemKind::Note, self.recent_notes) {
            Ok(notes) => {
                if !notes.is_empty() {
                    let refs: Vec<&Entry> = notes.iter().collect();
                    sections.push(section("Recent notes", &refs, self.recent_notes));
                }
            }
            Err(e) => warn!("Context summary: recent notes unavailable: {}", e),
        }

        sections.join("\n")
    }
}

impl Default for ContextSummarizer {
    fn default() -> Self {
        Self::new(&SummaryConfig::default())
    }
}

fn section(label: &str, entries: &[&Entry], limit: usize) -> String {
    let highlights: Vec<&str> = entries
        .iter()
        .take(limit)
        .map(|e| {
            if e.title.is_empty() {
                e.content.as_str()
            } else {
                e.title.as_str()
            }
        })
        .collect();
    format!("{} ({}): {}", label, entries.len(), highlights.join("; "))
}

// =============================================================================
// Tests
// =============================================================================
