//! Relative date and time-phrase resolution.
//!
//! Scans an utterance for day words ("today", "tomorrow") and for explicit
//! time phrases of the shape `(before|by|at) H[:MM] am/pm`, producing the
//! time context the rest of the rule chain works from.

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

/// Resolved temporal facts about one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeContext {
    /// Base calendar date implied by day words (defaults to the current day).
    pub base: NaiveDate,
    /// Explicit wall-clock time when the utterance carried a time phrase.
    pub explicit_time: Option<NaiveTime>,
    pub mentions_today: bool,
    pub mentions_tomorrow: bool,
}

fn today_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\btoday\b").expect("Invalid today regex"))
}

fn tomorrow_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\btomorrow\b").expect("Invalid tomorrow regex"))
}

fn time_phrase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:before|by|at)\s+(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b")
            .expect("Invalid time phrase regex")
    })
}

/// Resolve the time context of an utterance relative to `now`.
pub fn resolve(utterance: &str, now: DateTime<Local>) -> TimeContext {
    let mentions_today = today_re().is_match(utterance);
    let mentions_tomorrow = tomorrow_re().is_match(utterance);

    let base = if mentions_tomorrow && !mentions_today {
        now.date_naive().succ_opt().unwrap_or(now.date_naive())
    } else {
        now.date_naive()
    };

    TimeContext {
        base,
        explicit_time: parse_time_phrase(utterance),
        mentions_today,
        mentions_tomorrow,
    }
}

/// Parse the first `(before|by|at) H[:MM] am/pm` phrase in the text.
///
/// Returns `None` for hours outside 1-12 or minutes outside 0-59.
pub fn parse_time_phrase(text: &str) -> Option<NaiveTime> {
    let caps = time_phrase_re().captures(text)?;
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if !(1..=12).contains(&hour) {
        return None;
    }

    let meridiem = caps.get(3)?.as_str().to_lowercase();
    let hour24 = match (meridiem.as_str(), hour) {
        ("am", 12) => 0,
        ("am", h) => h,
        ("pm", 12) => 12,
        ("pm", h) => h + 12,
        _ => return None,
    };

    NaiveTime::from_hms_opt(hour24, minute, 0)
}

/// Strip a trailing schedule phrase (time phrase and/or day words) from a
/// captured fragment, e.g. `"the budget before 3pm today"` -> `"the budget"`.
pub fn trim_schedule_suffix(fragment: &str) -> String {
    let mut out = fragment.to_string();
    if let Some(m) = time_phrase_re().find(&out) {
        out.truncate(m.start());
    }

    static TRAILING_DAY: OnceLock<Regex> = OnceLock::new();
    let trailing = TRAILING_DAY.get_or_init(|| {
        Regex::new(r"(?i)[\s.,!?]*\b(?:today|tomorrow)\b[\s.,!?]*$")
            .expect("Invalid trailing day regex")
    });
    loop {
        let trimmed = trailing.replace(&out, "").into_owned();
        if trimmed == out {
            break;
        }
        out = trimmed;
    }

    out.trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | '!' | '?'))
        .to_string()
}

// =============================================================================
// Tests
// =============================================================================
