//! Conversation staging state.
//!
//! Owns the turn list and the pending proposals attached to assistant
//! turns. Proposals are addressed by stable, monotonically assigned IDs and
//! carry an explicit state (pending/accepted/rejected) instead of being
//! removed from a dense array, so no reference is ever invalidated by an
//! index shift. Rendering filters by state: accepted proposals disappear
//! from the pending view, rejected ones stay visible.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::types::{
    ActionProposal, ConversationTurn, ProposalId, ProposalPatch, ProposalState, Role,
    StagedProposal, TurnPhase,
};

/// Serialized conversation state: the turns plus the proposal-ID counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    pub turns: Vec<ConversationTurn>,
    pub next_proposal_id: ProposalId,
}

/// Manages the per-conversation staging buffer.
pub struct StagingManager {
    state: Mutex<ConversationState>,
}

impl StagingManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConversationState::default()),
        }
    }

    /// Rebuild a manager from previously serialized state.
    pub fn from_state(state: ConversationState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConversationState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Staging state lock poisoned; continuing with inner state");
                poisoned.into_inner()
            }
        }
    }

    /// Append a user turn.
    pub fn push_user_turn(&self, text: &str) -> Uuid {
        let mut state = self.lock();
        let id = Uuid::new_v4();
        state.turns.push(ConversationTurn {
            id,
            role: Role::User,
            text: text.to_string(),
            staged: Vec::new(),
        });
        id
    }

    /// Append an assistant turn, staging `proposals` when non-empty.
    ///
    /// An empty proposal list creates no staging area; the turn is plain
    /// text and immediately resolved.
    pub fn push_assistant_turn(&self, text: &str, proposals: Vec<ActionProposal>) -> Uuid {
        let mut state = self.lock();
        let id = Uuid::new_v4();
        let staged = proposals
            .into_iter()
            .map(|proposal| {
                let pid = state.next_proposal_id;
                state.next_proposal_id += 1;
                StagedProposal {
                    id: pid,
                    proposal,
                    state: ProposalState::Pending,
                }
            })
            .collect();
        state.turns.push(ConversationTurn {
            id,
            role: Role::Assistant,
            text: text.to_string(),
            staged,
        });
        id
    }

    /// Mark a pending proposal rejected. Idempotent; the proposal stays in
    /// the turn and remains renderable.
    pub fn reject(&self, turn_id: Uuid, proposal_id: ProposalId) -> bool {
        let mut state = self.lock();
        let Some(staged) = find_mut(&mut state, turn_id, proposal_id) else {
            return false;
        };
        match staged.state {
            ProposalState::Pending | ProposalState::Rejected => {
                staged.state = ProposalState::Rejected;
                true
            }
            ProposalState::Accepted => false,
        }
    }

    /// Merge `patch` into a pending proposal. Silent no-op (returns false)
    /// when the turn or proposal no longer exists or is no longer pending.
    pub fn patch(&self, turn_id: Uuid, proposal_id: ProposalId, patch: &ProposalPatch) -> bool {
        let mut state = self.lock();
        let Some(staged) = find_mut(&mut state, turn_id, proposal_id) else {
            return false;
        };
        if staged.state != ProposalState::Pending {
            return false;
        }
        patch.apply(&mut staged.proposal);
        true
    }

    /// Accept one pending proposal, optionally swapping in a user-edited
    /// version first. Returns the proposal to commit.
    pub fn accept_one(
        &self,
        turn_id: Uuid,
        proposal_id: ProposalId,
        edited: Option<ActionProposal>,
    ) -> Option<ActionProposal> {
        let mut state = self.lock();
        let staged = find_mut(&mut state, turn_id, proposal_id)?;
        if staged.state != ProposalState::Pending {
            return None;
        }
        if let Some(edited) = edited {
            staged.proposal = edited;
        }
        staged.state = ProposalState::Accepted;
        Some(staged.proposal.clone())
    }

    /// Accept every pending proposal of a turn in original staging order.
    /// Returns the batch to commit; the turn's pending view is empty after.
    pub fn accept_all(&self, turn_id: Uuid) -> Vec<ActionProposal> {
        let mut state = self.lock();
        let Some(turn) = state.turns.iter_mut().find(|t| t.id == turn_id) else {
            return Vec::new();
        };
        let mut accepted = Vec::new();
        for staged in &mut turn.staged {
            if staged.state == ProposalState::Pending {
                staged.state = ProposalState::Accepted;
                accepted.push(staged.proposal.clone());
            }
        }
        accepted
    }

    /// Pending proposals of a turn, in staging order.
    pub fn pending(&self, turn_id: Uuid) -> Vec<StagedProposal> {
        self.by_state(turn_id, ProposalState::Pending)
    }

    /// Rejected proposals of a turn, still addressable for display.
    pub fn rejected(&self, turn_id: Uuid) -> Vec<StagedProposal> {
        self.by_state(turn_id, ProposalState::Rejected)
    }

    fn by_state(&self, turn_id: Uuid, wanted: ProposalState) -> Vec<StagedProposal> {
        let state = self.lock();
        state
            .turns
            .iter()
            .find(|t| t.id == turn_id)
            .map(|t| {
                t.staged
                    .iter()
                    .filter(|s| s.state == wanted)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolution phase of a turn. Unknown turns read as resolved.
    pub fn phase(&self, turn_id: Uuid) -> TurnPhase {
        if self.pending(turn_id).is_empty() {
            TurnPhase::Resolved
        } else {
            TurnPhase::Staged
        }
    }

    /// All turns, for rendering and history.
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.lock().turns.clone()
    }

    /// Reset the conversation.
    pub fn clear(&self) {
        *self.lock() = ConversationState::default();
    }

    /// Snapshot of the current state for persistence.
    pub fn state(&self) -> ConversationState {
        self.lock().clone()
    }

    /// Replace the current state with a restored snapshot.
    pub fn load_state(&self, state: ConversationState) {
        *self.lock() = state;
    }
}

impl Default for StagingManager {
    fn default() -> Self {
        Self::new()
    }
}

fn find_mut<'a>(
    state: &'a mut ConversationState,
    turn_id: Uuid,
    proposal_id: ProposalId,
) -> Option<&'a mut StagedProposal> {
    state
        .turns
        .iter_mut()
        .find(|t| t.id == turn_id)?
        .staged
        .iter_mut()
        .find(|s| s.id == proposal_id)
}

// =============================================================================
// Tests
// =============================================================================
