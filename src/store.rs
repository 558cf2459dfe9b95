//! Persistence collaborator interface.
//!
//! The engine never talks to the database directly; the portal's data
//! layer implements this trait and hands over wire records. The in-memory
//! implementation backs tests and local development.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::types::{AssignmentRecord, HolidayDate};

/// Read access to the scheduling data this engine consumes.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Active assignments for a worker.
    async fn assignments_for_worker(&self, worker_id: Uuid) -> Result<Vec<AssignmentRecord>>;

    /// Holiday calendar entries for the inclusive year range.
    async fn holidays_in_range(&self, from_year: i32, to_year: i32) -> Result<Vec<HolidayDate>>;
}

/// In-memory store for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleStore {
    assignments: HashMap<Uuid, Vec<AssignmentRecord>>,
    holidays: Vec<HolidayDate>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assignments(mut self, worker_id: Uuid, records: Vec<AssignmentRecord>) -> Self {
        self.assignments.insert(worker_id, records);
        self
    }

    pub fn with_holidays(mut self, holidays: Vec<HolidayDate>) -> Self {
        self.holidays = holidays;
        self
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn assignments_for_worker(&self, worker_id: Uuid) -> Result<Vec<AssignmentRecord>> {
        Ok(self.assignments.get(&worker_id).cloned().unwrap_or_default())
    }

    async fn holidays_in_range(&self, from_year: i32, to_year: i32) -> Result<Vec<HolidayDate>> {
        Ok(self
            .holidays
            .iter()
            .copied()
            .filter(|holiday| holiday.year >= from_year && holiday.year <= to_year)
            .collect())
    }
}
