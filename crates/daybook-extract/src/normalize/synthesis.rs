//! Pattern-triggered candidate synthesis.
//!
//! An ordered chain of pure rules that add candidates the classifier likely
//! omitted. Each rule names its trigger and effect, and first checks the
//! candidate list (raw plus already-synthesized) for its keyword so the same
//! action is never proposed twice.

use chrono::NaiveTime;
use regex::Regex;
use std::sync::OnceLock;

use daybook_core::types::{ItemKind, Timestamp};

use crate::normalize::time::{trim_schedule_suffix, TimeContext};
use crate::types::RawCandidate;

/// A synthesis rule: (utterance, time context, candidates so far) -> maybe a
/// new candidate.
pub type SynthesisRule = fn(&str, &TimeContext, &[RawCandidate]) -> Option<RawCandidate>;

/// The rule chain, applied in order.
pub const RULES: &[SynthesisRule] = &[synthesize_reply, synthesize_call, synthesize_work_on];

/// Does any candidate's title+content mention `keyword` (case-insensitive)?
fn any_candidate_mentions(candidates: &[RawCandidate], keywords: &[&str]) -> bool {
    candidates.iter().any(|c| {
        let text = c.text().to_lowercase();
        keywords.iter().any(|k| text.contains(k))
    })
}

/// Cut a captured fragment at a coordinating conjunction so a rule does not
/// swallow the next clause of the utterance.
fn clip_clause(fragment: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\s+\b(?:and|then)\b\s+.*$").expect("Invalid clause regex")
    });
    re.replace(fragment, "").into_owned()
}

fn strip_leading_article(fragment: &str) -> &str {
    for article in ["the ", "a ", "an "] {
        if fragment.len() > article.len() && fragment[..article.len()].eq_ignore_ascii_case(article)
        {
            return &fragment[article.len()..];
        }
    }
    fragment
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// =============================================================================
// Reply rule
// =============================================================================

/// Trigger: the utterance mentions reply/respond/email and no candidate does.
/// Effect: a Reminder "Reply to <person>'s email[ about <subject>]", due at
/// the resolved date+time when the utterance carried an explicit time.
pub fn synthesize_reply(
    utterance: &str,
    ctx: &TimeContext,
    candidates: &[RawCandidate],
) -> Option<RawCandidate> {
    static TRIGGER: OnceLock<Regex> = OnceLock::new();
    let trigger = TRIGGER.get_or_init(|| {
        Regex::new(r"(?i)\b(?:reply|respond|email)\b").expect("Invalid reply trigger regex")
    });
    if !trigger.is_match(utterance) {
        return None;
    }
    if any_candidate_mentions(candidates, &["reply", "respond", "email"]) {
        return None;
    }

    static PERSON: OnceLock<Regex> = OnceLock::new();
    let person_re = PERSON.get_or_init(|| {
        Regex::new(r"(?i)\b(?:reply|respond)\s+to\s+([A-Za-z]+)'s\s+email\b")
            .expect("Invalid reply person regex")
    });
    let person = person_re
        .captures(utterance)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "their".to_string());

    static SUBJECT: OnceLock<Regex> = OnceLock::new();
    let subject_re = SUBJECT.get_or_init(|| {
        Regex::new(r"(?i)\b(?:on\s+the\s+subject\s+of|about)\s+(.+)$")
            .expect("Invalid reply subject regex")
    });
    let subject = subject_re
        .captures(utterance)
        .and_then(|c| c.get(1))
        .map(|m| trim_schedule_suffix(&clip_clause(m.as_str())))
        .map(|s| strip_leading_article(&s).to_string())
        .filter(|s| !s.is_empty());

    let possessive = if person.eq_ignore_ascii_case("their") {
        "their email".to_string()
    } else {
        format!("{}'s email", person)
    };
    let title = match subject {
        Some(ref s) => format!("Reply to {} about {}", possessive, s),
        None => format!("Reply to {}", possessive),
    };

    let mut candidate = RawCandidate::new(ItemKind::Reminder, title.clone(), title);
    candidate.when = ctx
        .explicit_time
        .map(|t| Timestamp::from_local(ctx.base, t));
    Some(candidate)
}

// =============================================================================
// Call rule
// =============================================================================

/// Trigger: "call <person>" in the utterance and no candidate mentions a
/// call. Effect: an undated Reminder "Call <person>" tagged
/// `["call", <person>]`. Pronoun objects do not synthesize.
pub fn synthesize_call(
    utterance: &str,
    _ctx: &TimeContext,
    candidates: &[RawCandidate],
) -> Option<RawCandidate> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\bcall\s+([A-Za-z]+)\b").expect("Invalid call regex")
    });
    let person = re.captures(utterance)?.get(1)?.as_str();

    const PRONOUNS: &[&str] = &["me", "them", "him", "her", "us", "you", "it", "back"];
    if PRONOUNS.contains(&person.to_lowercase().as_str()) {
        return None;
    }
    if any_candidate_mentions(candidates, &["call"]) {
        return None;
    }

    let title = format!("Call {}", capitalize_first(person));
    let mut candidate = RawCandidate::new(ItemKind::Reminder, title.clone(), title);
    candidate.tags = vec!["call".to_string(), person.to_lowercase()];
    Some(candidate)
}

// =============================================================================
// Work-on rule
// =============================================================================

/// Trigger: "work on <task>" in the utterance and no candidate mentions
/// work. Effect: a Todo "Work on <task>", dated at 00:00 of the base date
/// (a date with no specific time) only when "today" appears.
pub fn synthesize_work_on(
    utterance: &str,
    ctx: &TimeContext,
    candidates: &[RawCandidate],
) -> Option<RawCandidate> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\bwork\s+on\s+(.+)$").expect("Invalid work-on regex")
    });
    let captured = re.captures(utterance)?.get(1)?.as_str();
    if any_candidate_mentions(candidates, &["work"]) {
        return None;
    }

    let task = trim_schedule_suffix(&clip_clause(captured));
    if task.is_empty() {
        return None;
    }

    let title = format!("Work on {}", task);
    let mut candidate = RawCandidate::new(ItemKind::Todo, title.clone(), title);
    if ctx.mentions_today {
        candidate.when = Some(Timestamp::from_local(ctx.base, NaiveTime::MIN));
    }
    Some(candidate)
}

// =============================================================================
// Tests
// =============================================================================
