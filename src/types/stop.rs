//! Resolved route stops.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slot::TimeSlot;

/// One resolved occurrence of an assignment slot on a concrete date.
///
/// Stops are recomputed on demand per query cycle and never persisted;
/// once created they are not mutated (the sequencer assigns `order` before
/// handing the list out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub assignment_id: Uuid,
    pub client_label: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    /// Minutes since midnight of the slot start — the ordering key.
    pub start_minutes: u32,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    /// 1-based position after chronological ordering.
    pub order: i32,
}

impl RouteStop {
    /// Stops without a usable address stay on the schedule but are
    /// excluded from travel segmentation.
    pub fn has_address(&self) -> bool {
        self.address
            .as_deref()
            .map_or(false, |address| !address.trim().is_empty())
    }
}
