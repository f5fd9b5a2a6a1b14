//! Deterministic candidate normalization.
//!
//! Runs the heuristic rule chain over the classifier's raw candidates:
//! time-context resolution, pattern-triggered synthesis, missing-date
//! backfill, priority inference, and tag derivation. Every step is a pure
//! function of (utterance, candidate, now); re-running the normalizer on
//! its own output changes nothing.

pub mod priority;
pub mod synthesis;
pub mod tags;
pub mod time;

use chrono::{DateTime, Local, NaiveTime};

use daybook_core::config::ExtractionConfig;
use daybook_core::types::Timestamp;

use crate::types::RawCandidate;

/// The heuristic normalizer.
pub struct Normalizer {
    tag_limit: usize,
    morning: NaiveTime,
}

impl Normalizer {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            tag_limit: config.derived_tag_limit,
            morning: NaiveTime::from_hms_opt(config.morning_hour, 0, 0)
                .unwrap_or(NaiveTime::MIN),
        }
    }

    /// Resolve every optional field on `candidates` and synthesize the
    /// candidates the classifier likely omitted.
    ///
    /// Fields that are already set are never overwritten.
    pub fn normalize(
        &self,
        utterance: &str,
        mut candidates: Vec<RawCandidate>,
        now: DateTime<Local>,
    ) -> Vec<RawCandidate> {
        let ctx = time::resolve(utterance, now);

        // Pattern-triggered synthesis; each rule sees the list so far and
        // guards against duplicates.
        for rule in synthesis::RULES {
            if let Some(candidate) = rule(utterance, &ctx, &candidates) {
                candidates.push(candidate);
            }
        }

        for candidate in &mut candidates {
            // Missing-date backfill. An utterance with an explicit time only
            // dates reply-flavored candidates; a bare "today" gives the rest
            // a morning default.
            if candidate.when.is_none() {
                if let Some(t) = ctx.explicit_time {
                    if is_reply_flavored(candidate) {
                        candidate.when = Some(Timestamp::from_local(ctx.base, t));
                    }
                } else if ctx.mentions_today && !is_reply_flavored(candidate) {
                    candidate.when = Some(Timestamp::from_local(ctx.base, self.morning));
                }
            }

            if candidate.priority.is_none() {
                candidate.priority = Some(priority::infer(candidate, utterance));
            }

            if candidate.tags.is_empty() {
                candidate.tags =
                    tags::derive(&candidate.title, &candidate.content, self.tag_limit);
            }
        }

        candidates
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

fn is_reply_flavored(candidate: &RawCandidate) -> bool {
    let text = candidate.text().to_lowercase();
    ["reply", "respond", "email"]
        .iter()
        .any(|k| text.contains(k))
}

// =============================================================================
// Tests
// =============================================================================
