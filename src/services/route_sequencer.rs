//! Route sequencing: expand assignments across a date range into a
//! chronologically ordered list of stops.
//!
//! No optimization happens here — stops are sequenced strictly by
//! scheduled start time.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::types::{Assignment, HolidaySet, RouteStop};

use super::schedule_resolver::{resolve_slots_for_date, ResolverPolicy};

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// All dates in the range, in order. Empty when `start > end`.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        let mut current = Some(self.start);
        std::iter::from_fn(move || {
            let date = current?;
            if date > end {
                current = None;
                return None;
            }
            current = date.succ_opt();
            Some(date)
        })
    }

    /// Calendar years touched by the range, for scoping the holiday fetch.
    pub fn years(&self) -> (i32, i32) {
        (self.start.year(), self.end.year())
    }
}

/// Expand `assignments` over `range` and return the resolved stops in
/// strict `(date, start time)` order, with 1-based `order` assigned.
///
/// Dates outside an assignment's validity window are skipped; equal
/// `(date, start)` pairs keep their input order (stable sort, no tie-break
/// on client name).
pub fn build_stops(
    assignments: &[Assignment],
    range: &DateRange,
    holidays: &HolidaySet,
    policy: &ResolverPolicy,
) -> Vec<RouteStop> {
    let mut stops = Vec::new();
    for assignment in assignments {
        for date in range.iter_days() {
            if !assignment.is_active_on(date) {
                continue;
            }
            for slot in resolve_slots_for_date(assignment, date, holidays, policy) {
                stops.push(RouteStop {
                    assignment_id: assignment.id,
                    client_label: assignment.client_label.clone(),
                    date,
                    slot,
                    start_minutes: slot.start_minutes(),
                    address: assignment.address.clone(),
                    postal_code: assignment.postal_code.clone(),
                    city: assignment.city.clone(),
                    order: 0,
                });
            }
        }
    }

    stops.sort_by_key(|stop| (stop.date, stop.start_minutes));
    for (index, stop) in stops.iter_mut().enumerate() {
        stop.order = index as i32 + 1;
    }
    stops
}

/// Partition stops by calendar day.
pub fn group_by_day(stops: &[RouteStop]) -> BTreeMap<NaiveDate, Vec<RouteStop>> {
    let mut groups: BTreeMap<NaiveDate, Vec<RouteStop>> = BTreeMap::new();
    for stop in stops {
        groups.entry(stop.date).or_default().push(stop.clone());
    }
    groups
}

/// Partition stops by week, keyed by the Monday anchoring each week.
pub fn group_by_week(stops: &[RouteStop]) -> BTreeMap<NaiveDate, Vec<RouteStop>> {
    let mut groups: BTreeMap<NaiveDate, Vec<RouteStop>> = BTreeMap::new();
    for stop in stops {
        groups.entry(week_anchor(stop.date)).or_default().push(stop.clone());
    }
    groups
}

/// Monday of the week containing `date`.
fn week_anchor(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Whether an assignment produces at least one stop anywhere in `range`.
///
/// Short-circuits on the first active day instead of materializing a
/// month's worth of stops — this is what the views use to decide whether
/// an assignment is worth showing at all.
pub fn is_active_in_range(
    assignment: &Assignment,
    range: &DateRange,
    holidays: &HolidaySet,
    policy: &ResolverPolicy,
) -> bool {
    range.iter_days().any(|date| {
        assignment.is_active_on(date)
            && !resolve_slots_for_date(assignment, date, holidays, policy).is_empty()
    })
}
