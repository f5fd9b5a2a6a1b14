//! The external classifier capability.
//!
//! The language-model call is consumed as an opaque, injected dependency:
//! given an utterance, recent history, and a context summary, it returns a
//! reply string plus raw action candidates. Everything downstream of it is
//! deterministic and testable against canned candidate lists.

use async_trait::async_trait;

use crate::error::ClassifierError;
use crate::types::{RawCandidate, Role};

/// One prior exchange handed to the classifier for grounding.
#[derive(Debug, Clone)]
pub struct HistoryMessage {
    pub role: Role,
    pub text: String,
}

/// The classifier's reply for a single utterance.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Conversational reply rendered as the assistant turn text.
    pub reply: String,
    /// Zero or more raw action candidates, any optional field may be absent.
    pub candidates: Vec<RawCandidate>,
}

/// The only suspending dependency of the engine.
///
/// Failures surface immediately as an error reply; there is no retry policy
/// here and no mid-flight cancellation.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        utterance: &str,
        history: &[HistoryMessage],
        context_summary: &str,
    ) -> Result<Classification, ClassifierError>;
}
