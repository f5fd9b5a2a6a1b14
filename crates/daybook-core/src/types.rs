//! Core value types shared across the Daybook crates.
//!
//! Defines the kinds of capturable items, the quadrant priority labels,
//! and the epoch-seconds timestamp newtype.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Enums
// =============================================================================

/// The kind of item a proposal or persistent entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Todo,
    Reminder,
    Note,
    Journal,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Todo => write!(f, "todo"),
            ItemKind::Reminder => write!(f, "reminder"),
            ItemKind::Note => write!(f, "note"),
            ItemKind::Journal => write!(f, "journal"),
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(ItemKind::Todo),
            "reminder" => Ok(ItemKind::Reminder),
            "note" => Ok(ItemKind::Note),
            "journal" => Ok(ItemKind::Journal),
            _ => Err(format!("Unknown item kind: {}", s)),
        }
    }
}

/// Urgency-by-importance quadrant classification.
///
/// Serialized with the canonical hyphenated labels, e.g. `urgent-important`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    UrgentImportant,
    NotUrgentImportant,
    UrgentNotImportant,
    NotUrgentNotImportant,
}

impl Priority {
    /// Map an (urgency, importance) pair onto its quadrant.
    pub fn from_flags(urgent: bool, important: bool) -> Self {
        match (urgent, important) {
            (true, true) => Priority::UrgentImportant,
            (false, true) => Priority::NotUrgentImportant,
            (true, false) => Priority::UrgentNotImportant,
            (false, false) => Priority::NotUrgentNotImportant,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::UrgentImportant => write!(f, "urgent-important"),
            Priority::NotUrgentImportant => write!(f, "not-urgent-important"),
            Priority::UrgentNotImportant => write!(f, "urgent-not-important"),
            Priority::NotUrgentNotImportant => write!(f, "not-urgent-not-important"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgent-important" => Ok(Priority::UrgentImportant),
            "not-urgent-important" => Ok(Priority::NotUrgentImportant),
            "urgent-not-important" => Ok(Priority::UrgentNotImportant),
            "not-urgent-not-important" => Ok(Priority::NotUrgentNotImportant),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

// =============================================================================
// Timestamp
// =============================================================================

/// Seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }

    /// Build a timestamp from a local calendar date and wall-clock time.
    ///
    /// DST gaps resolve to the earliest valid instant; a date outside the
    /// representable range falls back to interpreting the naive time as UTC.
    pub fn from_local(date: NaiveDate, time: chrono::NaiveTime) -> Self {
        let naive = date.and_time(time);
        match Local.from_local_datetime(&naive).earliest() {
            Some(dt) => Self(dt.timestamp()),
            None => Self(naive.and_utc().timestamp()),
        }
    }

    /// The local calendar date this instant falls on.
    pub fn local_date(&self) -> NaiveDate {
        Local
            .timestamp_opt(self.0, 0)
            .single()
            .map(|dt| dt.date_naive())
            .unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
