//! Field-level normalization rules
//!
//! Staged values are text. The helpers here coerce them to their final types with
//! fixed defaults: missing or unparseable numbers become 0, missing text becomes
//! the empty string, and missing clock times become `00:00:00`. Every rule is total.
//! Row-level mapping for each entity lives in [`entities`].

pub mod entities;

use chrono::NaiveDate;
use std::fmt;
use tracing::warn;

/// Clock time used when a race or pit stop has none
pub const DEFAULT_TIME_OF_DAY: &str = "00:00:00";

/// Finishing order given to results without a classified position
pub const UNCLASSIFIED_POSITION_ORDER: i64 = 999;

/// Rounds at or above this value no longer fit the two decimal digits of a race id
pub const MAX_ROUND: i64 = 100;

// ============================================================================
// Status taxonomy
// ============================================================================

/// Closed result status vocabulary
///
/// Upstream reports dozens of retirement causes; everything outside this list is
/// stored as [`Status::Retired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Finished,
    Disqualified,
    Accident,
    Collision,
    Engine,
    PlusOneLap,
    PlusTwoLaps,
    PlusThreeLaps,
    Retired,
}

impl Status {
    pub const ALL: [Status; 9] = [
        Status::Finished,
        Status::Disqualified,
        Status::Accident,
        Status::Collision,
        Status::Engine,
        Status::PlusOneLap,
        Status::PlusTwoLaps,
        Status::PlusThreeLaps,
        Status::Retired,
    ];

    /// Classify a status string; total over all inputs
    pub fn classify(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Finished") => Status::Finished,
            Some("Disqualified") => Status::Disqualified,
            Some("Accident") => Status::Accident,
            Some("Collision") => Status::Collision,
            Some("Engine") => Status::Engine,
            Some("+1 Lap") => Status::PlusOneLap,
            Some("+2 Laps") => Status::PlusTwoLaps,
            Some("+3 Laps") => Status::PlusThreeLaps,
            _ => Status::Retired,
        }
    }

    pub fn id(self) -> i64 {
        match self {
            Status::Finished => 1,
            Status::Disqualified => 2,
            Status::Accident => 3,
            Status::Collision => 4,
            Status::Engine => 5,
            Status::PlusOneLap => 11,
            Status::PlusTwoLaps => 12,
            Status::PlusThreeLaps => 13,
            Status::Retired => 14,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Disqualified => "Disqualified",
            Status::Accident => "Accident",
            Status::Collision => "Collision",
            Status::Engine => "Engine",
            Status::PlusOneLap => "+1 Lap",
            Status::PlusTwoLaps => "+2 Laps",
            Status::PlusThreeLaps => "+3 Laps",
            Status::Retired => "Retired",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status id for a raw status string
pub fn status_id(raw: Option<&str>) -> i64 {
    Status::classify(raw).id()
}

// ============================================================================
// Race identity
// ============================================================================

/// `year * 100 + round`, e.g. round 10 of 2024 is `202410`
///
/// Rounds of 100 or more would collide with the next season; they are logged and
/// computed as-is. Negative values and ids that overflow `i64` yield `None`.
pub fn race_id(year: i64, round: i64) -> Option<i64> {
    if year < 0 || round < 0 {
        warn!(year, round, "Negative season or round, no race id");
        return None;
    }
    if round >= MAX_ROUND {
        warn!(year, round, "Round out of range for race id encoding");
    }
    let id = year.checked_mul(100).and_then(|base| base.checked_add(round));
    if id.is_none() {
        warn!(year, round, "Race id overflows");
    }
    id
}

/// Finishing order: the classified position, else a staged order, else 999
pub fn position_order(position: Option<i64>, staged_order: Option<&str>) -> i64 {
    position
        .or_else(|| parse_int(staged_order))
        .unwrap_or(UNCLASSIFIED_POSITION_ORDER)
}

// ============================================================================
// Scalar coercion
// ============================================================================

/// Parse an integer, accepting integral decimals such as `"3.0"`
pub fn parse_int(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    // `as` saturates, so anything outside the i64 range is rejected first
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && ((i64::MIN as f64)..(i64::MAX as f64)).contains(v))
        .map(|v| v as i64)
}

pub fn parse_float(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub fn int_or_zero(raw: Option<&str>) -> i64 {
    parse_int(raw).unwrap_or(0)
}

pub fn float_or_zero(raw: Option<&str>) -> f64 {
    parse_float(raw).unwrap_or(0.0)
}

pub fn text_or_empty(raw: Option<String>) -> String {
    raw.unwrap_or_default()
}

/// Clock time with a trailing `Z` removed, defaulting to `00:00:00`
pub fn time_of_day(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .map(|s| s.trim_end_matches('Z'))
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_TIME_OF_DAY)
        .to_string()
}

/// Calendar date from `YYYY-MM-DD`, also accepting a trailing time component
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

// ============================================================================
// Durations
// ============================================================================

/// Seconds in a duration written as `ss.fff`, `m:ss.fff` or `h:mm:ss.fff`
pub fn parse_duration_secs(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let (units, seconds) = parts.split_at(parts.len() - 1);
    let seconds = seconds.first()?.parse::<f64>().ok().filter(|s| *s >= 0.0)?;

    // hours and minutes fold into whole minutes
    let mut minutes = 0.0;
    for unit in units {
        let value = unit.parse::<u32>().ok()?;
        minutes = minutes * 60.0 + f64::from(value);
    }

    Some(minutes * 60.0 + seconds).filter(|t| t.is_finite())
}

/// Pit stop duration in milliseconds
///
/// An explicit millisecond value wins; otherwise the textual duration is converted
/// and rounded; otherwise 0.
pub fn pit_stop_millis(explicit: Option<&str>, duration: Option<&str>) -> i64 {
    if let Some(ms) = parse_int(explicit) {
        return ms;
    }
    duration
        .and_then(parse_duration_secs)
        .map(|secs| (secs * 1000.0).round() as i64)
        .unwrap_or(0)
}
