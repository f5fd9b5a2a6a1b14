//! Core types for the extraction engine.
//!
//! Defines raw classifier candidates, staged action proposals, conversation
//! turns, and commit outcomes.

use daybook_core::types::{ItemKind, Priority, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier for a staged proposal, monotonically assigned per
/// conversation. Never reused, never shifted by removals.
pub type ProposalId = u64;

// =============================================================================
// Enums
// =============================================================================

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Lifecycle state of a staged proposal.
///
/// Accepted proposals drop out of the pending view; rejected ones stay
/// visible and addressable. Neither is ever removed from the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    Pending,
    Accepted,
    Rejected,
}

/// Resolution phase of an assistant turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// At least one proposal is still awaiting a decision.
    Staged,
    /// Nothing pending: no candidates, or all accepted/rejected.
    Resolved,
}

// =============================================================================
// Candidates and proposals
// =============================================================================

/// A raw action candidate as returned by the external classifier.
///
/// `kind`, `title`, and `content` are always present; everything else may be
/// missing and is resolved by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub kind: ItemKind,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub when: Option<Timestamp>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl RawCandidate {
    /// A candidate with only the required fields set.
    pub fn new(kind: ItemKind, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            content: content.into(),
            when: None,
            tags: Vec::new(),
            priority: None,
        }
    }

    /// Title and content joined for text-level heuristics.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// A field-complete action proposal awaiting human confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionProposal {
    pub kind: ItemKind,
    pub title: String,
    pub content: String,
    pub when: Option<Timestamp>,
    pub tags: Vec<String>,
    pub priority: Priority,
}

impl ActionProposal {
    /// Promote a normalized candidate into a proposal.
    ///
    /// Candidates leaving the normalizer always carry a priority; a missing
    /// one (a candidate that bypassed normalization) lands in the lowest
    /// quadrant.
    pub fn from_candidate(candidate: RawCandidate) -> Self {
        Self {
            kind: candidate.kind,
            title: candidate.title,
            content: candidate.content,
            when: candidate.when,
            tags: candidate.tags,
            priority: candidate
                .priority
                .unwrap_or(Priority::NotUrgentNotImportant),
        }
    }
}

/// Field-level edits merged into a pending proposal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub when: Option<Timestamp>,
    pub tags: Option<Vec<String>>,
    pub priority: Option<Priority>,
}

impl ProposalPatch {
    /// Apply the set fields onto `proposal`, leaving the rest untouched.
    pub fn apply(&self, proposal: &mut ActionProposal) {
        if let Some(ref title) = self.title {
            proposal.title = title.clone();
        }
        if let Some(ref content) = self.content {
            proposal.content = content.clone();
        }
        if let Some(when) = self.when {
            proposal.when = Some(when);
        }
        if let Some(ref tags) = self.tags {
            proposal.tags = tags.clone();
        }
        if let Some(priority) = self.priority {
            proposal.priority = priority;
        }
    }
}

/// A proposal attached to a turn, addressed by its stable ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedProposal {
    pub id: ProposalId,
    pub proposal: ActionProposal,
    pub state: ProposalState,
}

// =============================================================================
// Conversation
// =============================================================================

/// One exchange in the conversation.
///
/// `staged` is empty for user turns and for assistant turns that yielded no
/// candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub staged: Vec<StagedProposal>,
}

// =============================================================================
// Commit outcome
// =============================================================================

/// Aggregate result of committing a batch of proposals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    /// New todo/reminder/note entries created.
    pub created: u32,
    /// Existing non-journal entries updated in place (unused by this
    /// engine, kept for the UI contract).
    pub updated: u32,
    /// Journal day records created or appended to.
    pub diary_updated: u32,
}

impl CommitOutcome {
    /// Single "items affected" count surfaced to the UI.
    pub fn total(&self) -> u32 {
        self.created + self.updated + self.diary_updated
    }
}

// =============================================================================
// Tests
// =============================================================================
