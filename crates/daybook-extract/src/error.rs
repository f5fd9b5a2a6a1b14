//! Error types for the extraction engine.

use daybook_core::error::DaybookError;

/// Errors from the external classifier capability.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),
    #[error("Classifier returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by the extraction orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("extraction engine is disabled")]
    Disabled,
    #[error("utterance cannot be empty")]
    EmptyUtterance,
    #[error("utterance exceeds maximum length of {0} characters")]
    UtteranceTooLong(usize),
    #[error("an extraction is already in flight")]
    Busy,
    #[error("classifier error: {0}")]
    Classifier(#[from] ClassifierError),
    #[error("storage error: {0}")]
    Storage(#[from] DaybookError),
}
