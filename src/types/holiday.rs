//! Holiday calendar snapshot.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Holiday calendar entry as persistence hands it over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

/// Authoritative set of holiday dates for one query cycle.
///
/// Fetched fresh per date-range query and treated as an immutable snapshot;
/// the engine never mutates it.
#[derive(Debug, Clone, Default)]
pub struct HolidaySet {
    dates: HashSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from wire entries. Impossible day/month combinations are
    /// dropped with a warning.
    pub fn from_dates<I: IntoIterator<Item = HolidayDate>>(dates: I) -> Self {
        let mut set = HashSet::new();
        for entry in dates {
            match NaiveDate::from_ymd_opt(entry.year, entry.month, entry.day) {
                Some(date) => {
                    set.insert(date);
                }
                None => warn!(
                    "Discarding impossible holiday date {}-{}-{}",
                    entry.year, entry.month, entry.day
                ),
            }
        }
        Self { dates: set }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
