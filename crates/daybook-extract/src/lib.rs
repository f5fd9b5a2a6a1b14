//! Action extraction engine for Daybook.
//!
//! Turns free-form utterances into typed action proposals, stages them for
//! human confirmation, and commits confirmed proposals into the entry store.

pub mod classifier;
pub mod commit;
pub mod context;
pub mod error;
pub mod normalize;
pub mod orchestrator;
pub mod staging;
pub mod types;

pub use classifier::{Classification, Classifier, HistoryMessage};
pub use commit::CommitEngine;
pub use context::ContextSummarizer;
pub use error::{ClassifierError, EngineError};
pub use normalize::Normalizer;
pub use orchestrator::{ExtractionOrchestrator, SendOutcome};
pub use staging::StagingManager;
pub use types::{
    ActionProposal, CommitOutcome, ConversationTurn, ProposalId, ProposalPatch, ProposalState,
    RawCandidate, Role, StagedProposal, TurnPhase,
};
