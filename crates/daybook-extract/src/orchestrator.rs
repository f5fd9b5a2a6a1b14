//! Extraction orchestrator: the coordinating layer of the engine.
//!
//! Wires the context summarizer, classifier, normalizer, staging manager,
//! and commit engine behind the send/accept/reject/patch/clear surface the
//! UI consumes. Only one extraction may be in flight at a time; staged
//! operations on prior turns stay available while it runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use tracing::warn;
use uuid::Uuid;

use daybook_core::config::DaybookConfig;
use daybook_core::types::Timestamp;
use daybook_store::{EntryStore, SnapshotStore};

use crate::classifier::{Classifier, HistoryMessage};
use crate::commit::CommitEngine;
use crate::context::ContextSummarizer;
use crate::error::EngineError;
use crate::normalize::Normalizer;
use crate::staging::{ConversationState, StagingManager};
use crate::types::{
    ActionProposal, CommitOutcome, ConversationTurn, ProposalId, ProposalPatch, StagedProposal,
    TurnPhase,
};

/// Key under which the serialized conversation is persisted.
const CONVERSATION_SNAPSHOT_KEY: &str = "conversation";

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// The assistant turn created for this exchange.
    pub turn_id: Uuid,
    /// The rendered reply text.
    pub reply: String,
    /// Number of proposals staged on the turn.
    pub staged: usize,
}

/// Central coordinator for one conversation.
pub struct ExtractionOrchestrator {
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn EntryStore>,
    summarizer: ContextSummarizer,
    normalizer: Normalizer,
    staging: StagingManager,
    commit: CommitEngine,
    extracting: AtomicBool,
    config: DaybookConfig,
}

impl ExtractionOrchestrator {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn EntryStore>,
        config: DaybookConfig,
    ) -> Self {
        Self {
            classifier,
            store,
            summarizer: ContextSummarizer::new(&config.summary),
            normalizer: Normalizer::new(&config.extraction),
            staging: StagingManager::new(),
            commit: CommitEngine::new(),
            extracting: AtomicBool::new(false),
            config,
        }
    }

    /// Process one utterance: summarize context, classify, normalize, stage.
    ///
    /// A classifier failure is surfaced as an assistant error turn with
    /// nothing staged; the conversation remains usable and the user may
    /// re-send. `Err` is reserved for caller mistakes: empty or oversized
    /// utterances, a disabled engine, or a send while one is in flight.
    pub async fn send(&self, utterance: &str) -> Result<SendOutcome, EngineError> {
        if !self.config.general.enabled {
            return Err(EngineError::Disabled);
        }
        if utterance.is_empty() {
            return Err(EngineError::EmptyUtterance);
        }
        let max = self.config.general.max_utterance_length;
        if utterance.len() > max {
            return Err(EngineError::UtteranceTooLong(max));
        }
        if self
            .extracting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::Busy);
        }

        let history = self.history_window();
        self.staging.push_user_turn(utterance);
        let context = self.summarizer.summarize(self.store.as_ref());

        let result = self
            .classifier
            .classify(utterance, &history, &context)
            .await;
        self.extracting.store(false, Ordering::SeqCst);

        match result {
            Ok(classification) => {
                let candidates = self.normalizer.normalize(
                    utterance,
                    classification.candidates,
                    Local::now(),
                );
                let proposals: Vec<ActionProposal> = candidates
                    .into_iter()
                    .map(ActionProposal::from_candidate)
                    .collect();
                let staged = proposals.len();
                let turn_id = self
                    .staging
                    .push_assistant_turn(&classification.reply, proposals);
                Ok(SendOutcome {
                    turn_id,
                    reply: classification.reply,
                    staged,
                })
            }
            Err(e) => {
                warn!("Classifier call failed: {}", e);
                let reply = format!("Sorry, I couldn't process that ({}). Please try again.", e);
                let turn_id = self.staging.push_assistant_turn(&reply, vec![]);
                Ok(SendOutcome {
                    turn_id,
                    reply,
                    staged: 0,
                })
            }
        }
    }

    /// Whether a classifier call is currently outstanding.
    pub fn is_extracting(&self) -> bool {
        self.extracting.load(Ordering::SeqCst)
    }

    /// Accept one proposal (optionally user-edited) and commit it.
    ///
    /// Returns `None` when the turn or proposal no longer exists or was
    /// already decided.
    pub fn accept_one(
        &self,
        turn_id: Uuid,
        proposal_id: ProposalId,
        edited: Option<ActionProposal>,
    ) -> Option<CommitOutcome> {
        let proposal = self.staging.accept_one(turn_id, proposal_id, edited)?;
        Some(
            self.commit
                .commit(self.store.as_ref(), &[proposal], Timestamp::now()),
        )
    }

    /// Accept every pending proposal of a turn as one best-effort batch.
    pub fn accept_all(&self, turn_id: Uuid) -> CommitOutcome {
        let batch = self.staging.accept_all(turn_id);
        if batch.is_empty() {
            return CommitOutcome::default();
        }
        self.commit
            .commit(self.store.as_ref(), &batch, Timestamp::now())
    }

    /// Mark a proposal rejected; it stays visible but is never committed.
    pub fn reject_one(&self, turn_id: Uuid, proposal_id: ProposalId) -> bool {
        self.staging.reject(turn_id, proposal_id)
    }

    /// Merge field edits into a pending proposal.
    pub fn patch_pending(
        &self,
        turn_id: Uuid,
        proposal_id: ProposalId,
        patch: &ProposalPatch,
    ) -> bool {
        self.staging.patch(turn_id, proposal_id, patch)
    }

    /// Pending proposals of a turn.
    pub fn pending(&self, turn_id: Uuid) -> Vec<StagedProposal> {
        self.staging.pending(turn_id)
    }

    /// Rejected proposals of a turn.
    pub fn rejected(&self, turn_id: Uuid) -> Vec<StagedProposal> {
        self.staging.rejected(turn_id)
    }

    /// Resolution phase of a turn.
    pub fn phase(&self, turn_id: Uuid) -> TurnPhase {
        self.staging.phase(turn_id)
    }

    /// Full conversation history for rendering.
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.staging.turns()
    }

    /// Drop the conversation, including any staged proposals.
    pub fn clear(&self) {
        self.staging.clear();
    }

    /// Persist the serialized conversation state.
    pub fn persist(&self, snapshots: &dyn SnapshotStore) -> daybook_core::error::Result<()> {
        let json = serde_json::to_string(&self.staging.state())?;
        snapshots.save(CONVERSATION_SNAPSHOT_KEY, &json)
    }

    /// Restore a previously persisted conversation.
    ///
    /// A missing or malformed snapshot is discarded with a warning and the
    /// conversation starts fresh; restoring never fails the caller.
    pub fn restore(&self, snapshots: &dyn SnapshotStore) {
        let loaded = match snapshots.load(CONVERSATION_SNAPSHOT_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!("Conversation snapshot unavailable: {}", e);
                return;
            }
        };
        let Some(json) = loaded else {
            return;
        };
        match serde_json::from_str::<ConversationState>(&json) {
            Ok(state) => self.staging.load_state(state),
            Err(e) => {
                warn!("Discarding malformed conversation snapshot: {}", e);
                if let Err(e) = snapshots.delete(CONVERSATION_SNAPSHOT_KEY) {
                    warn!("Failed to delete malformed snapshot: {}", e);
                }
            }
        }
    }

    /// The most recent turns handed to the classifier for grounding.
    fn history_window(&self) -> Vec<HistoryMessage> {
        let turns = self.staging.turns();
        let keep = self.config.extraction.history_turns;
        let skip = turns.len().saturating_sub(keep);
        turns
            .into_iter()
            .skip(skip)
            .map(|t| HistoryMessage {
                role: t.role,
                text: t.text,
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use daybook_core::types::ItemKind;
    use daybook_store::{MemorySnapshots, MemoryStore};
    use tokio::sync::oneshot;

    use crate::classifier::Classification;
    use crate::error::ClassifierError;
    use crate::types::RawCandidate;

    struct CannedClassifier {
        reply: String,
        candidates: Vec<RawCandidate>,
    }

    #[async_trait]
    impl Classifier for CannedClassifier {
        async fn classify(
            &self,
            _utterance: &str,
            _history: &[HistoryMessage],
            _context_summary: &str,
        ) -> Result<Classification, ClassifierError> {
            Ok(Classification {
                reply: self.reply.clone(),
                candidates: self.candidates.clone(),
            })
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl Classifier for FailingClassifier {
        async fn classify(
            &self,
            _utterance: &str,
            _history: &[HistoryMessage],
            _context_summary: &str,
        ) -> Result<Classification, ClassifierError> {
            Err(ClassifierError::Unavailable("connection refused".to_string()))
        }
    }

    /// Blocks inside classify until released, to exercise the busy flag.
    struct GatedClassifier {
        gate: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl Classifier for GatedClassifier {
        async fn classify(
            &self,
            _utterance: &str,
            _history: &[HistoryMessage],
            _context_summary: &str,
        ) -> Result<Classification, ClassifierError> {
            if let Some(rx) = self.gate.lock().await.take() {
                let _ = rx.await;
            }
            Ok(Classification {
                reply: "done".to_string(),
                candidates: vec![],
            })
        }
    }

    fn orchestrator(classifier: Arc<dyn Classifier>) -> ExtractionOrchestrator {
        ExtractionOrchestrator::new(
            classifier,
            Arc::new(MemoryStore::new()),
            DaybookConfig::default(),
        )
    }

    fn orchestrator_with_store(
        classifier: Arc<dyn Classifier>,
        store: Arc<MemoryStore>,
    ) -> ExtractionOrchestrator {
        ExtractionOrchestrator::new(classifier, store, DaybookConfig::default())
    }

    fn canned(candidates: Vec<RawCandidate>) -> Arc<dyn Classifier> {
        Arc::new(CannedClassifier {
            reply: "Here's what I found.".to_string(),
            candidates,
        })
    }

    // ---- Validation ----

    #[tokio::test]
    async fn test_empty_utterance_rejected() {
        let orch = orchestrator(canned(vec![]));
        assert!(matches!(
            orch.send("").await.unwrap_err(),
            EngineError::EmptyUtterance
        ));
    }

    #[tokio::test]
    async fn test_oversized_utterance_rejected() {
        let orch = orchestrator(canned(vec![]));
        let huge = "a".repeat(2001);
        assert!(matches!(
            orch.send(&huge).await.unwrap_err(),
            EngineError::UtteranceTooLong(2000)
        ));
    }

    #[tokio::test]
    async fn test_disabled_engine_rejected() {
        let mut config = DaybookConfig::default();
        config.general.enabled = false;
        let orch = ExtractionOrchestrator::new(
            canned(vec![]),
            Arc::new(MemoryStore::new()),
            config,
        );
        assert!(matches!(
            orch.send("hello").await.unwrap_err(),
            EngineError::Disabled
        ));
    }

    // ---- Send / staging ----

    #[tokio::test]
    async fn test_send_records_both_turns() {
        let orch = orchestrator(canned(vec![]));
        let outcome = orch.send("just chatting").await.unwrap();
        let turns = orch.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text, "just chatting");
        assert_eq!(turns[1].id, outcome.turn_id);
        assert_eq!(turns[1].text, "Here's what I found.");
    }

    #[tokio::test]
    async fn test_no_candidates_resolves_immediately() {
        let orch = orchestrator(canned(vec![]));
        let outcome = orch.send("nothing actionable here").await.unwrap();
        assert_eq!(outcome.staged, 0);
        assert!(orch.pending(outcome.turn_id).is_empty());
        assert_eq!(orch.phase(outcome.turn_id), TurnPhase::Resolved);
    }

    #[tokio::test]
    async fn test_candidates_are_normalized_and_staged() {
        let orch = orchestrator(canned(vec![RawCandidate::new(
            ItemKind::Todo,
            "Fix deploy script",
            "pipeline is red",
        )]));
        let outcome = orch.send("fix the deploy script").await.unwrap();
        assert_eq!(outcome.staged, 1);
        assert_eq!(orch.phase(outcome.turn_id), TurnPhase::Staged);

        let pending = orch.pending(outcome.turn_id);
        assert_eq!(pending.len(), 1);
        // The normalizer resolved priority and tags on the way in.
        assert!(!pending[0].proposal.tags.is_empty());
    }

    #[tokio::test]
    async fn test_synthesis_runs_even_with_empty_classifier_output() {
        let orch = orchestrator(canned(vec![]));
        let outcome = orch
            .send("I need to call Sam and reply to Jane's email about the budget before 3pm today")
            .await
            .unwrap();
        assert_eq!(outcome.staged, 2);
    }

    // ---- Classifier failure ----

    #[tokio::test]
    async fn test_classifier_failure_stages_nothing() {
        let orch = orchestrator(Arc::new(FailingClassifier));
        let outcome = orch.send("remind me to stretch").await.unwrap();
        assert_eq!(outcome.staged, 0);
        assert!(outcome.reply.contains("connection refused"));

        // The error landed as an assistant turn; conversation stays usable.
        let turns = orch.turns();
        assert_eq!(turns.len(), 2);
        assert!(!orch.is_extracting());
    }

    #[tokio::test]
    async fn test_conversation_usable_after_classifier_failure() {
        let store = Arc::new(MemoryStore::new());
        let orch = orchestrator_with_store(Arc::new(FailingClassifier), Arc::clone(&store));
        orch.send("first try").await.unwrap();
        let second = orch.send("second try").await.unwrap();
        assert_eq!(orch.turns().len(), 4);
        assert_eq!(second.staged, 0);
    }

    // ---- Busy flag ----

    #[tokio::test]
    async fn test_send_refused_while_extraction_in_flight() {
        let (tx, rx) = oneshot::channel();
        let orch = Arc::new(orchestrator(Arc::new(GatedClassifier {
            gate: tokio::sync::Mutex::new(Some(rx)),
        })));

        let in_flight = {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.send("first").await })
        };

        // Let the spawned send reach the classifier and park.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(orch.is_extracting());
        assert!(matches!(
            orch.send("second").await.unwrap_err(),
            EngineError::Busy
        ));

        // Staged operations on prior turns remain available while busy:
        // nothing staged yet, but the call is accepted rather than refused.
        assert!(!orch.reject_one(Uuid::new_v4(), 0));

        tx.send(()).unwrap();
        let outcome = in_flight.await.unwrap().unwrap();
        assert_eq!(outcome.reply, "done");
        assert!(!orch.is_extracting());

        // And a fresh send goes through.
        orch.send("third").await.unwrap();
    }

    // ---- Accept / reject / patch / commit ----

    fn reminder_candidate(title: &str) -> RawCandidate {
        RawCandidate::new(ItemKind::Reminder, title, title)
    }

    #[tokio::test]
    async fn test_accept_one_commits_and_removes() {
        let store = Arc::new(MemoryStore::new());
        let orch = orchestrator_with_store(
            canned(vec![reminder_candidate("Call Bob")]),
            Arc::clone(&store),
        );
        let outcome = orch.send("call Bob about things").await.unwrap();
        let id = orch.pending(outcome.turn_id)[0].id;

        let commit = orch.accept_one(outcome.turn_id, id, None).unwrap();
        assert_eq!(commit.created, 1);
        assert_eq!(store.len(), 1);
        assert!(orch.pending(outcome.turn_id).is_empty());
        assert_eq!(orch.phase(outcome.turn_id), TurnPhase::Resolved);
    }

    #[tokio::test]
    async fn test_accept_one_with_edit_commits_edited_fields() {
        let store = Arc::new(MemoryStore::new());
        let orch = orchestrator_with_store(
            canned(vec![reminder_candidate("Call Bob")]),
            Arc::clone(&store),
        );
        let outcome = orch.send("call Bob").await.unwrap();
        let staged = &orch.pending(outcome.turn_id)[0];

        let mut edited = staged.proposal.clone();
        edited.title = "Call Robert".to_string();
        orch.accept_one(outcome.turn_id, staged.id, Some(edited))
            .unwrap();

        let committed = store.list_recent(ItemKind::Reminder, 1).unwrap();
        assert_eq!(committed[0].title, "Call Robert");
    }

    #[tokio::test]
    async fn test_accept_one_unknown_proposal_returns_none() {
        let orch = orchestrator(canned(vec![]));
        let outcome = orch.send("hello").await.unwrap();
        assert!(orch.accept_one(outcome.turn_id, 99, None).is_none());
    }

    #[tokio::test]
    async fn test_scenario_accept_all_creates_two() {
        let store = Arc::new(MemoryStore::new());
        let orch = orchestrator_with_store(canned(vec![]), Arc::clone(&store));
        let outcome = orch
            .send("I need to call Sam and reply to Jane's email about the budget before 3pm today")
            .await
            .unwrap();
        assert_eq!(outcome.staged, 2);

        let commit = orch.accept_all(outcome.turn_id);
        assert_eq!(commit.created, 2);
        assert_eq!(commit.total(), 2);
        assert!(orch.pending(outcome.turn_id).is_empty());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_accept_all_skips_rejected() {
        let store = Arc::new(MemoryStore::new());
        let orch = orchestrator_with_store(
            canned(vec![
                reminder_candidate("Call Bob"),
                reminder_candidate("Ping Alice"),
            ]),
            Arc::clone(&store),
        );
        let outcome = orch.send("do both of these").await.unwrap();
        let ids: Vec<ProposalId> =
            orch.pending(outcome.turn_id).iter().map(|s| s.id).collect();
        orch.reject_one(outcome.turn_id, ids[0]);

        let commit = orch.accept_all(outcome.turn_id);
        assert_eq!(commit.created, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(orch.rejected(outcome.turn_id).len(), 1);
    }

    #[tokio::test]
    async fn test_accept_all_empty_turn_is_zero_outcome() {
        let orch = orchestrator(canned(vec![]));
        let outcome = orch.send("hello").await.unwrap();
        assert_eq!(orch.accept_all(outcome.turn_id), CommitOutcome::default());
    }

    #[tokio::test]
    async fn test_journal_proposal_merges_on_accept() {
        let store = Arc::new(MemoryStore::new());
        let orch = orchestrator_with_store(
            canned(vec![RawCandidate::new(
                ItemKind::Journal,
                "",
                "Long day, shipped the fix.",
            )]),
            Arc::clone(&store),
        );
        let outcome = orch.send("journal: long day, shipped the fix").await.unwrap();
        let commit = orch.accept_all(outcome.turn_id);
        assert_eq!(commit.diary_updated, 1);
        assert_eq!(commit.created, 0);
    }

    #[tokio::test]
    async fn test_patch_then_accept_commits_patched_date() {
        let store = Arc::new(MemoryStore::new());
        let orch = orchestrator_with_store(
            canned(vec![reminder_candidate("Call Bob")]),
            Arc::clone(&store),
        );
        let outcome = orch.send("call Bob").await.unwrap();
        let id = orch.pending(outcome.turn_id)[0].id;

        let patch = ProposalPatch {
            when: Some(Timestamp(1700003600)),
            ..ProposalPatch::default()
        };
        assert!(orch.patch_pending(outcome.turn_id, id, &patch));
        orch.accept_one(outcome.turn_id, id, None).unwrap();

        let committed = store.list_recent(ItemKind::Reminder, 1).unwrap();
        assert_eq!(committed[0].when, Some(Timestamp(1700003600)));
    }

    // ---- Clear ----

    #[tokio::test]
    async fn test_clear_drops_conversation() {
        let orch = orchestrator(canned(vec![reminder_candidate("Call Bob")]));
        orch.send("call Bob").await.unwrap();
        orch.clear();
        assert!(orch.turns().is_empty());
    }

    // ---- Snapshot persistence ----

    #[tokio::test]
    async fn test_persist_and_restore_round_trip() {
        let snapshots = MemorySnapshots::new();
        let store = Arc::new(MemoryStore::new());

        let orch = orchestrator_with_store(
            canned(vec![reminder_candidate("Call Bob")]),
            Arc::clone(&store),
        );
        let outcome = orch.send("call Bob").await.unwrap();
        orch.persist(&snapshots).unwrap();

        let restored = orchestrator_with_store(canned(vec![]), Arc::clone(&store));
        restored.restore(&snapshots);
        assert_eq!(restored.turns().len(), 2);
        assert_eq!(restored.pending(outcome.turn_id).len(), 1);

        // Staged decisions still work after the restart.
        let id = restored.pending(outcome.turn_id)[0].id;
        let commit = restored.accept_one(outcome.turn_id, id, None).unwrap();
        assert_eq!(commit.created, 1);
    }

    #[tokio::test]
    async fn test_restore_missing_snapshot_starts_fresh() {
        let snapshots = MemorySnapshots::new();
        let orch = orchestrator(canned(vec![]));
        orch.restore(&snapshots);
        assert!(orch.turns().is_empty());
    }

    #[tokio::test]
    async fn test_restore_malformed_snapshot_discards_it() {
        let snapshots = MemorySnapshots::new();
        snapshots
            .save("conversation", "{\"turns\": \"not an array\"}")
            .unwrap();

        let orch = orchestrator(canned(vec![]));
        orch.restore(&snapshots);
        assert!(orch.turns().is_empty());
        // The bad snapshot was dropped so the next load starts clean.
        assert!(snapshots.load("conversation").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_garbage_snapshot_discards_it() {
        let snapshots = MemorySnapshots::new();
        snapshots.save("conversation", "not json at all").unwrap();
        let orch = orchestrator(canned(vec![]));
        orch.restore(&snapshots);
        assert!(orch.turns().is_empty());
    }
}
