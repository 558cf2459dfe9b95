//! Per-date schedule resolution.
//!
//! Given one assignment, a concrete calendar date, and the holiday set,
//! determine which time slots are actually active that day.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::types::{Assignment, AssignmentType, HolidaySet, TimeSlot};

/// Deployment-level calendar policy.
///
/// The portal's regions disagree on whether holiday-schedule workers also
/// cover Saturdays, so the rule is a configuration knob instead of a fixed
/// constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverPolicy {
    /// When true, Saturdays count as holiday-like days: festivos workers
    /// are active and flexible workers prefer their holiday slots.
    pub festivos_include_saturday: bool,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            festivos_include_saturday: true,
        }
    }
}

/// Resolve the active slots of `assignment` on `date`.
///
/// An empty result means "no service that day" — it is not an error and is
/// indistinguishable from a legitimately idle day. Schedules that arrived
/// malformed were already reduced to empty plans at the persistence
/// boundary.
pub fn resolve_slots_for_date(
    assignment: &Assignment,
    date: NaiveDate,
    holidays: &HolidaySet,
    policy: &ResolverPolicy,
) -> Vec<TimeSlot> {
    let weekday = date.weekday();
    let is_holiday = holidays.contains(date);
    let holiday_like = is_holiday
        || weekday == Weekday::Sun
        || (weekday == Weekday::Sat && policy.festivos_include_saturday);

    let schedule = &assignment.schedule;
    match assignment.assignment_type {
        AssignmentType::Laborables => {
            if is_weekday(weekday) && !is_holiday {
                schedule.day(weekday).active_slots().to_vec()
            } else {
                Vec::new()
            }
        }
        AssignmentType::Festivos => {
            if holiday_like {
                schedule.holiday_slots().to_vec()
            } else {
                Vec::new()
            }
        }
        AssignmentType::Flexible | AssignmentType::Daily => {
            let holiday_slots = schedule.holiday_slots();
            if holiday_like && !holiday_slots.is_empty() {
                holiday_slots.to_vec()
            } else {
                // The holiday schedule takes priority but never produces
                // an empty day merely by being unset.
                schedule.day(weekday).active_slots().to_vec()
            }
        }
    }
}

fn is_weekday(weekday: Weekday) -> bool {
    !matches!(weekday, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Assignment, AssignmentRecord, HolidayDate};
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn assignment(assignment_type: &str, schedule: Value) -> Assignment {
        Assignment::from_record(AssignmentRecord {
            id: Uuid::new_v4(),
            assignment_type: assignment_type.to_string(),
            schedule,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: None,
            client_name: "Amparo".to_string(),
            client_surname: None,
            address: None,
            postal_code: None,
            city: None,
        })
    }

    fn weekday_schedule() -> Value {
        json!({
            "monday": {"enabled": true, "timeSlots": [{"start": "8:00", "end": "12:00"}]},
            "tuesday": {"enabled": true, "timeSlots": [{"start": "9:00", "end": "13:00"}]},
            "saturday": {"enabled": true, "timeSlots": [{"start": "10:00", "end": "11:00"}]},
            "sunday": {"enabled": true, "timeSlots": [{"start": "17:00", "end": "18:00"}]},
            "holiday": {"enabled": true, "timeSlots": [{"start": "10:00", "end": "12:00"}]}
        })
    }

    fn no_holidays() -> HolidaySet {
        HolidaySet::new()
    }

    // 2026-04-06 is a Monday, 2026-04-07 a Tuesday, 2026-04-11 a Saturday,
    // 2026-04-12 a Sunday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 6).unwrap()
    }
    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 7).unwrap()
    }
    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 11).unwrap()
    }
    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 12).unwrap()
    }

    fn holiday_on(date: NaiveDate) -> HolidaySet {
        HolidaySet::from_dates(vec![HolidayDate {
            day: date.day(),
            month: date.month(),
            year: date.year(),
        }])
    }

    #[test]
    fn test_laborables_active_on_plain_monday() {
        let a = assignment("laborables", weekday_schedule());
        let slots = resolve_slots_for_date(&a, monday(), &no_holidays(), &ResolverPolicy::default());
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].to_string(), "08:00-12:00");
    }

    #[test]
    fn test_laborables_always_empty_on_saturday() {
        let a = assignment("laborables", weekday_schedule());
        for policy in [
            ResolverPolicy { festivos_include_saturday: true },
            ResolverPolicy { festivos_include_saturday: false },
        ] {
            assert!(resolve_slots_for_date(&a, saturday(), &no_holidays(), &policy).is_empty());
        }
    }

    #[test]
    fn test_laborables_empty_on_holiday_monday() {
        let a = assignment("laborables", weekday_schedule());
        let slots = resolve_slots_for_date(&a, monday(), &holiday_on(monday()), &ResolverPolicy::default());
        assert!(slots.is_empty());
    }

    #[test]
    fn test_festivos_uses_holiday_slots_on_holiday_tuesday() {
        let a = assignment("festivos", weekday_schedule());
        let slots = resolve_slots_for_date(&a, tuesday(), &holiday_on(tuesday()), &ResolverPolicy::default());
        assert_eq!(slots.len(), 1);
        // Holiday slots, not the Tuesday weekday slots.
        assert_eq!(slots[0].to_string(), "10:00-12:00");
    }

    #[test]
    fn test_festivos_empty_on_plain_tuesday() {
        let a = assignment("festivos", weekday_schedule());
        assert!(resolve_slots_for_date(&a, tuesday(), &no_holidays(), &ResolverPolicy::default()).is_empty());
    }

    #[test]
    fn test_festivos_saturday_policy_toggle() {
        let a = assignment("festivos", weekday_schedule());

        let with_saturday = ResolverPolicy { festivos_include_saturday: true };
        assert_eq!(
            resolve_slots_for_date(&a, saturday(), &no_holidays(), &with_saturday).len(),
            1
        );

        let sunday_only = ResolverPolicy { festivos_include_saturday: false };
        assert!(resolve_slots_for_date(&a, saturday(), &no_holidays(), &sunday_only).is_empty());
        // Sundays are holiday-like under both policies.
        assert_eq!(
            resolve_slots_for_date(&a, sunday(), &no_holidays(), &sunday_only).len(),
            1
        );
    }

    #[test]
    fn test_festivos_prefers_holiday_config_override() {
        let a = assignment(
            "festivos",
            json!({
                "holiday": {"enabled": true, "timeSlots": [{"start": "10:00", "end": "12:00"}]},
                "holiday_config": {"holiday_timeSlots": [{"start": "16:00", "end": "18:00"}]}
            }),
        );
        let slots = resolve_slots_for_date(&a, sunday(), &no_holidays(), &ResolverPolicy::default());
        assert_eq!(slots[0].to_string(), "16:00-18:00");
    }

    #[test]
    fn test_flexible_uses_holiday_slots_on_sunday() {
        let a = assignment("flexible", weekday_schedule());
        let slots = resolve_slots_for_date(&a, sunday(), &no_holidays(), &ResolverPolicy::default());
        assert_eq!(slots[0].to_string(), "10:00-12:00");
    }

    #[test]
    fn test_flexible_falls_back_to_weekday_slots_on_sunday() {
        let a = assignment(
            "flexible",
            json!({
                "sunday": {"enabled": true, "timeSlots": [{"start": "17:00", "end": "18:00"}]},
                "holiday": {"enabled": true, "timeSlots": []}
            }),
        );
        let slots = resolve_slots_for_date(&a, sunday(), &no_holidays(), &ResolverPolicy::default());
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].to_string(), "17:00-18:00");
    }

    #[test]
    fn test_daily_active_on_plain_weekday() {
        let a = assignment("daily", weekday_schedule());
        let slots = resolve_slots_for_date(&a, tuesday(), &no_holidays(), &ResolverPolicy::default());
        assert_eq!(slots[0].to_string(), "09:00-13:00");
    }

    #[test]
    fn test_disabled_day_contributes_no_slots() {
        let a = assignment(
            "laborables",
            json!({"monday": {"enabled": false, "timeSlots": [{"start": "8:00", "end": "12:00"}]}}),
        );
        assert!(resolve_slots_for_date(&a, monday(), &no_holidays(), &ResolverPolicy::default()).is_empty());
    }

    #[test]
    fn test_unknown_type_resolves_as_laborables() {
        let a = assignment("turno-extra", weekday_schedule());
        assert_eq!(
            resolve_slots_for_date(&a, monday(), &no_holidays(), &ResolverPolicy::default()).len(),
            1
        );
        assert!(resolve_slots_for_date(&a, sunday(), &no_holidays(), &ResolverPolicy::default()).is_empty());
    }

    #[test]
    fn test_malformed_schedule_resolves_empty() {
        let a = assignment("daily", json!("completely broken"));
        assert!(resolve_slots_for_date(&a, monday(), &no_holidays(), &ResolverPolicy::default()).is_empty());
    }
}
