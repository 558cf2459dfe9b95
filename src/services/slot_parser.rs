//! Slot normalization for raw per-day schedule data.

use serde_json::Value;
use tracing::debug;

use crate::types::TimeSlot;

/// Normalize raw slot entries into validated time slots.
///
/// Entries that are not objects, lack string `start`/`end` fields, fail
/// the `H:MM`/`HH:MM` pattern, or cannot form a valid window are dropped —
/// malformed data is excluded, never an error. No merging and no overlap
/// resolution happens here: an assignment may legitimately define several
/// disjoint windows per day (morning + afternoon visits), so duplicates
/// and overlaps pass through unchanged.
pub fn parse_slots(raw: &[Value]) -> Vec<TimeSlot> {
    raw.iter()
        .filter_map(|entry| {
            let start = entry.get("start").and_then(Value::as_str)?;
            let end = entry.get("end").and_then(Value::as_str)?;
            match TimeSlot::parse(start, end) {
                Some(slot) => Some(slot),
                None => {
                    debug!("Dropping malformed slot entry '{}'-'{}'", start, end);
                    None
                }
            }
        })
        .collect()
}
