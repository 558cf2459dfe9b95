//! Worker schedule facade.
//!
//! The portal's calendar, agenda, and route views all need the same
//! pipeline: fetch a worker's assignments and the holiday calendar,
//! resolve each day, and hand back ordered stops. This facade is that
//! pipeline, so each view stays a thin consumer passing its own date
//! range.

use anyhow::Result;
use uuid::Uuid;

use crate::store::ScheduleStore;
use crate::types::{Assignment, HolidaySet, RouteStop};

use super::route_sequencer::{build_stops, is_active_in_range, DateRange};
use super::schedule_resolver::ResolverPolicy;

pub struct ScheduleService<S> {
    store: S,
    policy: ResolverPolicy,
}

impl<S: ScheduleStore> ScheduleService<S> {
    pub fn new(store: S, policy: ResolverPolicy) -> Self {
        Self { store, policy }
    }

    /// Assignments that produce at least one stop in `range` — what the
    /// views use to decide which assignments to show at all.
    pub async fn active_assignments(
        &self,
        worker_id: Uuid,
        range: &DateRange,
    ) -> Result<Vec<Assignment>> {
        let (assignments, holidays) = self.load(worker_id, range).await?;
        Ok(assignments
            .into_iter()
            .filter(|assignment| is_active_in_range(assignment, range, &holidays, &self.policy))
            .collect())
    }

    /// The worker's ordered stops across `range`.
    pub async fn stops_for_worker(
        &self,
        worker_id: Uuid,
        range: &DateRange,
    ) -> Result<Vec<RouteStop>> {
        let (assignments, holidays) = self.load(worker_id, range).await?;
        Ok(build_stops(&assignments, range, &holidays, &self.policy))
    }

    async fn load(
        &self,
        worker_id: Uuid,
        range: &DateRange,
    ) -> Result<(Vec<Assignment>, HolidaySet)> {
        let records = self.store.assignments_for_worker(worker_id).await?;
        let (from_year, to_year) = range.years();
        let holidays = self.store.holidays_in_range(from_year, to_year).await?;

        let assignments = records.into_iter().map(Assignment::from_record).collect();
        Ok((assignments, HolidaySet::from_dates(holidays)))
    }
}
