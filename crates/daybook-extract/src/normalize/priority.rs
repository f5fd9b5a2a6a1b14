//! Quadrant priority inference.
//!
//! Classifies urgency and importance from lexicon hits over the combined
//! candidate text and utterance, then maps the pair onto one of the four
//! quadrant labels.

use daybook_core::types::Priority;

use crate::types::RawCandidate;

/// Terms signalling time pressure. Matched as whole words/phrases.
const URGENCY_TERMS: &[&str] = &[
    "today",
    "urgent",
    "asap",
    "immediately",
    "deadline",
    "now",
    "tonight",
    "this morning",
    "this afternoon",
];

/// Terms signalling stakes. Matched as whole words.
const IMPORTANCE_TERMS: &[&str] = &[
    "contract",
    "client",
    "meeting",
    "deliverable",
    "project",
    "important",
    "critical",
    "essential",
    "boss",
    "manager",
];

/// Infer the quadrant for a candidate without an explicit priority.
///
/// Urgency is true on a lexicon hit or a resolved due date; importance only
/// on a lexicon hit. Both signals read the candidate's title+content plus
/// the full utterance.
pub fn infer(candidate: &RawCandidate, utterance: &str) -> Priority {
    let combined = normalize(&format!("{} {}", candidate.text(), utterance));
    let urgent = candidate.when.is_some() || matches_any(&combined, URGENCY_TERMS);
    let important = matches_any(&combined, IMPORTANCE_TERMS);
    Priority::from_flags(urgent, important)
}

/// Lowercase and pad a text so whole-word containment checks work for both
/// single words and two-word phrases.
fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(" {} ", collapsed)
}

fn matches_any(normalized: &str, terms: &[&str]) -> bool {
    terms
        .iter()
        .any(|term| normalized.contains(&format!(" {} ", term)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::types::{ItemKind, Timestamp};

    fn candidate(title: &str) -> RawCandidate {
        RawCandidate::new(ItemKind::Todo, title, "")
    }

    #[test]
    fn test_neither_signal_lands_lowest_quadrant() {
        let p = infer(&candidate("water the plants"), "water the plants sometime");
        assert_eq!(p, Priority::NotUrgentNotImportant);
    }

    #[test]
    fn test_urgency_from_utterance_day_word() {
        let p = infer(&candidate("water the plants"), "water the plants today");
        assert_eq!(p, Priority::UrgentNotImportant);
    }

    #[test]
    fn test_urgency_from_candidate_text() {
        let p = infer(&candidate("submit report asap"), "please handle this");
        assert_eq!(p, Priority::UrgentNotImportant);
    }

    #[test]
    fn test_urgency_from_resolved_date() {
        let mut c = candidate("water the plants");
        c.when = Some(Timestamp(1700003600));
        let p = infer(&c, "water the plants sometime");
        assert_eq!(p, Priority::UrgentNotImportant);
    }

    #[test]
    fn test_importance_without_urgency() {
        let p = infer(
            &candidate("draft the contract renewal"),
            "draft the contract renewal next week",
        );
        assert_eq!(p, Priority::NotUrgentImportant);
    }

    #[test]
    fn test_both_signals_land_top_quadrant() {
        let p = infer(
            &candidate("prep client deck"),
            "prep the client deck today",
        );
        assert_eq!(p, Priority::UrgentImportant);
    }

    #[test]
    fn test_now_matches_whole_word_only() {
        // "know" must not trigger the "now" urgency term.
        let p = infer(&candidate("let me know"), "let me know what you think");
        assert_eq!(p, Priority::NotUrgentNotImportant);

        let p = infer(&candidate("do it now"), "do it now");
        assert_eq!(p, Priority::UrgentNotImportant);
    }

    #[test]
    fn test_two_word_phrase_matches() {
        let p = infer(&candidate("standup"), "join the standup this morning");
        assert_eq!(p, Priority::UrgentNotImportant);
    }

    #[test]
    fn test_punctuation_does_not_hide_terms() {
        let p = infer(&candidate("reply"), "it's urgent! reply soon");
        assert_eq!(p, Priority::UrgentNotImportant);
    }

    #[test]
    fn test_case_insensitive() {
        let p = infer(&candidate("ping the MANAGER"), "ping the MANAGER TODAY");
        assert_eq!(p, Priority::UrgentImportant);
    }

    #[test]
    fn test_budget_is_not_an_importance_term() {
        let p = infer(
            &candidate("review the budget"),
            "review the budget today",
        );
        assert_eq!(p, Priority::UrgentNotImportant);
    }
}
