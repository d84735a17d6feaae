//! Engagement scoring.
//!
//! A score is the event's base value plus a recency bonus and a
//! repeat-interaction bonus, capped at [`MAX_SCORE`]. Everything here is
//! pure; the caller supplies the clock.

use crate::api::events::{EventKind, EventPayload};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

pub const MAX_SCORE: u8 = 100;

/// Tunable scoring constants. The defaults are the production values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Base score for event types outside the known table.
    pub unknown_base: u8,
    /// Events younger than this get `recency_bonus`.
    pub recency_window_secs: i64,
    pub recency_bonus: u8,
    pub repeat_bonus_per_interaction: u8,
    pub repeat_bonus_cap: u8,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            unknown_base: 5,
            recency_window_secs: 3600,
            recency_bonus: 10,
            repeat_bonus_per_interaction: 5,
            repeat_bonus_cap: 25,
        }
    }
}

/// How a score was put together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub base: u8,
    pub recency: u8,
    pub repeat: u8,
    pub total: u8,
}

pub fn base_score(kind: EventKind, rules: &ScoringRules) -> u8 {
    match kind {
        EventKind::DashboardView => 15,
        EventKind::EmailOpen => 10,
        EventKind::EmailClick => 25,
        EventKind::FormSubmission => 40,
        EventKind::PhoneCall => 35,
        EventKind::TextResponse => 30,
        EventKind::PropertyView => 20,
        EventKind::ScheduleAppointment => 50,
        EventKind::Unknown => rules.unknown_base,
    }
}

const ZONED_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

/// Accepts ISO-8601 with a `Z` suffix or a numeric offset (converted to
/// UTC) and naive forms (read as UTC), at minute precision or finer.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let zoned = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(head) => format!("{}+00:00", head),
        None => raw.to_string(),
    };
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn recency_bonus(payload: &EventPayload, rules: &ScoringRules, now: DateTime<Utc>) -> u8 {
    let Some(raw) = payload.timestamp() else {
        return 0;
    };
    let Some(ts) = parse_timestamp(raw) else {
        log::debug!("ignoring unparseable event timestamp {:?}", raw);
        return 0;
    };
    let age_ms = now.signed_duration_since(ts).num_milliseconds();
    if age_ms < rules.recency_window_secs.saturating_mul(1000) {
        rules.recency_bonus
    } else {
        0
    }
}

pub fn repeat_bonus(payload: &EventPayload, rules: &ScoringRules) -> u8 {
    let n = payload.interaction_count();
    if n <= 1 {
        return 0;
    }
    let cap = i64::from(rules.repeat_bonus_cap);
    let bonus = n.saturating_mul(i64::from(rules.repeat_bonus_per_interaction)).min(cap);
    u8::try_from(bonus).unwrap_or(rules.repeat_bonus_cap)
}

pub fn score_breakdown(
    kind: EventKind,
    payload: &EventPayload,
    rules: &ScoringRules,
    now: DateTime<Utc>,
) -> ScoreBreakdown {
    let base = base_score(kind, rules);
    let recency = recency_bonus(payload, rules, now);
    let repeat = repeat_bonus(payload, rules);
    let sum = u16::from(base) + u16::from(recency) + u16::from(repeat);
    ScoreBreakdown {
        base,
        recency,
        repeat,
        total: sum.min(u16::from(MAX_SCORE)) as u8,
    }
}

pub fn score_event(kind: EventKind, payload: &EventPayload, rules: &ScoringRules, now: DateTime<Utc>) -> u8 {
    score_breakdown(kind, payload, rules, now).total
}
