//! Validated time-of-day slots.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A validated service window within a single day.
///
/// Serialized as zero-padded `"HH:MM"` strings regardless of how the raw
/// schedule wrote the hour (`"8:00"` becomes `"08:00"`). Invariant:
/// `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Parse a start/end pair. Both fields must match `H:MM`/`HH:MM`, name
    /// a real wall-clock time, and satisfy `start < end` — otherwise the
    /// pair cannot form a valid slot and `None` is returned.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        let start = parse_hhmm(start)?;
        let end = parse_hhmm(end)?;
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Slot length in minutes. Positive by construction.
    pub fn minutes(&self) -> u32 {
        (self.end.num_seconds_from_midnight() - self.start.num_seconds_from_midnight()) / 60
    }

    /// Minutes since midnight of the slot start — the route ordering key.
    pub fn start_minutes(&self) -> u32 {
        self.start.num_seconds_from_midnight() / 60
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Parse `H:MM`/`HH:MM`. Anything else (seconds, blanks, out-of-range
/// values) is rejected.
fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let (hours, minutes) = raw.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if minutes.len() != 2 || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}'", raw)))
    }
}
