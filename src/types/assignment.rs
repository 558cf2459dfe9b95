//! Assignment types and schedule validation.
//!
//! The portal stores each assignment's weekly schedule as loosely-typed
//! JSON. It is validated exactly once, here, when the record crosses the
//! persistence boundary — the resolver only ever sees typed data, and
//! malformed input degrades to an empty schedule instead of an error.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::services::slot_parser::parse_slots;

use super::slot::TimeSlot;

/// Which calendar days an assignment is active on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    /// Mon-Fri, except holidays.
    Laborables,
    /// Weekend days and holidays only.
    Festivos,
    /// Every day; the holiday schedule takes priority when set.
    Flexible,
    /// Every day; same calendar policy as flexible.
    Daily,
}

impl AssignmentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Laborables => "laborables",
            Self::Festivos => "festivos",
            Self::Flexible => "flexible",
            Self::Daily => "daily",
        }
    }

    /// Parse the persisted type string. Unrecognized values fall back to
    /// the weekday policy.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "laborables" => Self::Laborables,
            "festivos" => Self::Festivos,
            "flexible" => Self::Flexible,
            "daily" => Self::Daily,
            other => {
                warn!("Unknown assignment type '{}', treating as laborables", other);
                Self::Laborables
            }
        }
    }
}

/// One weekday's (or the holiday entry's) plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayPlan {
    pub enabled: bool,
    pub slots: Vec<TimeSlot>,
}

impl DayPlan {
    pub fn new(enabled: bool, slots: Vec<TimeSlot>) -> Self {
        Self { enabled, slots }
    }

    /// Slots this plan contributes — none when the day is switched off.
    pub fn active_slots(&self) -> &[TimeSlot] {
        if self.enabled {
            &self.slots
        } else {
            &[]
        }
    }
}

const WEEKDAY_KEYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Validated weekly schedule: seven weekday plans, the holiday plan, and
/// the optional richer holiday override from `holiday_config`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekSchedule {
    days: [DayPlan; 7],
    pub holiday: DayPlan,
    pub holiday_override: Option<Vec<TimeSlot>>,
}

impl WeekSchedule {
    /// Build from the raw schedule JSON. Never fails: malformed input
    /// yields an all-disabled schedule (logged), so "no slots" stays the
    /// universal empty case downstream.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                warn!("Schedule JSON is not an object, treating as empty");
            }
            return Self::default();
        };

        let mut schedule = Self::default();
        for (index, key) in WEEKDAY_KEYS.iter().enumerate() {
            if let Some(day) = map.get(*key) {
                schedule.days[index] = parse_day_plan(day);
            }
        }
        if let Some(holiday) = map.get("holiday") {
            schedule.holiday = parse_day_plan(holiday);
        }
        if let Some(raw) = map
            .get("holiday_config")
            .and_then(|config| config.get("holiday_timeSlots"))
            .and_then(Value::as_array)
        {
            schedule.holiday_override = Some(parse_slots(raw));
        }
        schedule
    }

    /// The plan for a concrete weekday.
    pub fn day(&self, weekday: Weekday) -> &DayPlan {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    pub fn set_day(&mut self, weekday: Weekday, plan: DayPlan) {
        self.days[weekday.num_days_from_monday() as usize] = plan;
    }

    /// Slots for holiday-like days. The richer `holiday_config` override is
    /// authoritative when non-empty; otherwise the plain holiday entry
    /// applies (respecting its `enabled` flag).
    pub fn holiday_slots(&self) -> &[TimeSlot] {
        match &self.holiday_override {
            Some(slots) if !slots.is_empty() => slots,
            _ => self.holiday.active_slots(),
        }
    }
}

fn parse_day_plan(value: &Value) -> DayPlan {
    let enabled = value.get("enabled").and_then(Value::as_bool).unwrap_or(false);
    let slots = value
        .get("timeSlots")
        .and_then(Value::as_array)
        .map(|raw| parse_slots(raw))
        .unwrap_or_default();
    DayPlan { enabled, slots }
}

/// Assignment as persistence hands it over — schedule still raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: Uuid,
    pub assignment_type: String,
    pub schedule: Value,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub client_name: String,
    pub client_surname: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

/// Validated recurring service contract between a worker and a client.
///
/// A missing address excludes the client's stops from travel segmentation
/// but not from scheduling.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub id: Uuid,
    pub assignment_type: AssignmentType,
    pub schedule: WeekSchedule,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub client_label: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

impl Assignment {
    /// Validate a wire record. Never fails — bad schedule data degrades to
    /// an empty schedule at this boundary.
    pub fn from_record(record: AssignmentRecord) -> Self {
        let client_label = match record.client_surname.as_deref() {
            Some(surname) if !surname.trim().is_empty() => {
                format!("{} {}", record.client_name, surname)
            }
            _ => record.client_name.clone(),
        };
        Self {
            id: record.id,
            assignment_type: AssignmentType::parse(&record.assignment_type),
            schedule: WeekSchedule::from_value(&record.schedule),
            start_date: record.start_date,
            end_date: record.end_date,
            client_label,
            address: record.address,
            postal_code: record.postal_code,
            city: record.city,
        }
    }

    /// Whether `date` falls within the contract's validity window
    /// (open-ended when `end_date` is absent).
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        if date < self.start_date {
            return false;
        }
        match self.end_date {
            Some(end) => date <= end,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(assignment_type: &str, schedule: Value) -> AssignmentRecord {
        AssignmentRecord {
            id: Uuid::new_v4(),
            assignment_type: assignment_type.to_string(),
            schedule,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: None,
            client_name: "Carmen".to_string(),
            client_surname: Some("Robles".to_string()),
            address: Some("Calle Mayor 12".to_string()),
            postal_code: Some("28013".to_string()),
            city: Some("Madrid".to_string()),
        }
    }

    #[test]
    fn test_assignment_type_parse_known() {
        assert_eq!(AssignmentType::parse("festivos"), AssignmentType::Festivos);
        assert_eq!(AssignmentType::parse("daily"), AssignmentType::Daily);
    }

    #[test]
    fn test_assignment_type_parse_unknown_falls_back() {
        assert_eq!(AssignmentType::parse("nocturno"), AssignmentType::Laborables);
    }

    #[test]
    fn test_week_schedule_from_value() {
        let schedule = WeekSchedule::from_value(&json!({
            "monday": {"enabled": true, "timeSlots": [{"start": "8:00", "end": "12:00"}]},
            "tuesday": {"enabled": false, "timeSlots": [{"start": "9:00", "end": "11:00"}]},
            "holiday": {"enabled": true, "timeSlots": [{"start": "10:00", "end": "12:00"}]}
        }));

        let monday = schedule.day(Weekday::Mon);
        assert!(monday.enabled);
        assert_eq!(monday.slots.len(), 1);
        assert_eq!(monday.slots[0].to_string(), "08:00-12:00");

        // Disabled day keeps its slots but contributes none.
        let tuesday = schedule.day(Weekday::Tue);
        assert!(!tuesday.enabled);
        assert!(tuesday.active_slots().is_empty());

        assert_eq!(schedule.holiday_slots().len(), 1);
    }

    #[test]
    fn test_week_schedule_malformed_is_empty() {
        for bad in [json!("not a schedule"), json!(42), json!(null), json!([1, 2])] {
            let schedule = WeekSchedule::from_value(&bad);
            assert_eq!(schedule, WeekSchedule::default());
            assert!(schedule.holiday_slots().is_empty());
        }
    }

    #[test]
    fn test_holiday_override_wins_when_non_empty() {
        let schedule = WeekSchedule::from_value(&json!({
            "holiday": {"enabled": true, "timeSlots": [{"start": "10:00", "end": "12:00"}]},
            "holiday_config": {"holiday_timeSlots": [{"start": "16:00", "end": "18:00"}]}
        }));
        assert_eq!(schedule.holiday_slots().len(), 1);
        assert_eq!(schedule.holiday_slots()[0].to_string(), "16:00-18:00");
    }

    #[test]
    fn test_empty_holiday_override_falls_back() {
        let schedule = WeekSchedule::from_value(&json!({
            "holiday": {"enabled": true, "timeSlots": [{"start": "10:00", "end": "12:00"}]},
            "holiday_config": {"holiday_timeSlots": []}
        }));
        assert_eq!(schedule.holiday_slots()[0].to_string(), "10:00-12:00");
    }

    #[test]
    fn test_from_record_builds_client_label() {
        let assignment = Assignment::from_record(record("laborables", json!({})));
        assert_eq!(assignment.client_label, "Carmen Robles");

        let mut rec = record("laborables", json!({}));
        rec.client_surname = None;
        assert_eq!(Assignment::from_record(rec).client_label, "Carmen");
    }

    #[test]
    fn test_from_record_unknown_type_and_bad_schedule() {
        let mut rec = record("algo-raro", json!("garbage"));
        rec.end_date = NaiveDate::from_ymd_opt(2026, 6, 30);
        let assignment = Assignment::from_record(rec);
        assert_eq!(assignment.assignment_type, AssignmentType::Laborables);
        assert_eq!(assignment.schedule, WeekSchedule::default());
    }

    #[test]
    fn test_is_active_on_window() {
        let mut rec = record("daily", json!({}));
        rec.start_date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        rec.end_date = NaiveDate::from_ymd_opt(2026, 3, 31);
        let assignment = Assignment::from_record(rec);

        assert!(!assignment.is_active_on(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()));
        assert!(assignment.is_active_on(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
        assert!(assignment.is_active_on(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()));
        assert!(!assignment.is_active_on(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
    }

    #[test]
    fn test_is_active_on_open_ended() {
        let assignment = Assignment::from_record(record("daily", json!({})));
        assert!(assignment.is_active_on(NaiveDate::from_ymd_opt(2030, 12, 31).unwrap()));
    }

    #[test]
    fn test_record_deserializes_from_camel_case() {
        let json = r#"{
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "assignmentType": "festivos",
            "schedule": {},
            "startDate": "2026-01-01",
            "clientName": "Luis",
            "clientSurname": null,
            "address": null,
            "postalCode": null,
            "city": null
        }"#;
        let rec: AssignmentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.assignment_type, "festivos");
        assert!(rec.end_date.is_none());
    }
}
