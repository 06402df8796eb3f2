//! Tests for the `in_effect_on` filter and the archival sweep, the two
//! callers of the schedule queries.

use chrono::{TimeZone, Utc};
use chrono_tz::America::Montreal;
use road_schedule::{
    find_archivable, FilterConfig, InEffectOn, RoadEventDocument, Schedule, ScheduleError,
};

const WEEKDAYS_9_TO_5: &str = r#"{
    "schedules": [{
        "start_date": "2026-03-02",
        "days": [1, 2, 3, 4, 5],
        "daily_periods": [{"start": "09:00", "end": "17:00"}]
    }]
}"#;

fn schedule() -> Schedule {
    Schedule::from_json(WEEKDAYS_9_TO_5, Some(Montreal)).unwrap()
}

// ---------------------------------------------------------------------------
// in_effect_on
// ---------------------------------------------------------------------------

#[test]
fn now_uses_the_supplied_clock() {
    let filter: InEffectOn = "now".parse().unwrap();
    let config = FilterConfig::default();
    // Mon 2026-03-09 10:00 EDT
    let during = Utc.with_ymd_and_hms(2026, 3, 9, 14, 0, 0).unwrap();
    assert!(filter.matches(&schedule(), &config, during).unwrap());
    // Sat 2026-03-14 10:00 EDT
    let weekend = Utc.with_ymd_and_hms(2026, 3, 14, 14, 0, 0).unwrap();
    assert!(!filter.matches(&schedule(), &config, weekend).unwrap());
}

#[test]
fn single_instant() {
    let config = FilterConfig::default();
    let now = Utc::now();
    let during: InEffectOn = "2026-03-09T14:00:00Z".parse().unwrap();
    assert!(during.matches(&schedule(), &config, now).unwrap());
    let after_hours: InEffectOn = "2026-03-09T23:00:00Z".parse().unwrap();
    assert!(!after_hours.matches(&schedule(), &config, now).unwrap());
}

#[test]
fn range_over_a_weekend_only() {
    let config = FilterConfig::default();
    let now = Utc::now();
    let weekend: InEffectOn = "2026-03-14T00:00:00,2026-03-15T23:00:00".parse().unwrap();
    assert!(!weekend.matches(&schedule(), &config, now).unwrap());
    let into_monday: InEffectOn = "2026-03-14T00:00:00,2026-03-16T09:00:00".parse().unwrap();
    assert!(into_monday.matches(&schedule(), &config, now).unwrap());
}

#[test]
fn oversized_range_is_rejected_before_evaluation() {
    let filter: InEffectOn = "2026-03-01,2026-06-01".parse().unwrap();
    let err = filter
        .matches(&schedule(), &FilterConfig::default(), Utc::now())
        .unwrap_err();
    assert!(matches!(err, ScheduleError::RangeTooLarge { max_days: 40, .. }));
    assert!(err.to_string().contains("more than 40 days"));
}

// ---------------------------------------------------------------------------
// Archival sweep
// ---------------------------------------------------------------------------

fn events() -> Vec<RoadEventDocument> {
    serde_json::from_str(
        r#"[
            {
                "id": "test.open511.org/finished",
                "schedule": {"schedules": [{"start_date": "2026-01-01", "end_date": "2026-02-01"}]}
            },
            {
                "id": "test.open511.org/ongoing",
                "schedule": {"schedules": [{"start_date": "2026-01-01"}]}
            },
            {
                "id": "test.open511.org/already-archived",
                "active": false,
                "schedule": {"schedules": [{"start_date": "2026-01-01", "end_date": "2026-02-01"}]}
            },
            {
                "id": "test.open511.org/one-off",
                "schedule": {
                    "timezone": "America/Vancouver",
                    "schedules": [{"specific_dates": ["2026-03-02 08:00-09:00"]}]
                }
            }
        ]"#,
    )
    .unwrap()
}

#[test]
fn sweep_reports_finished_active_events() {
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let report = find_archivable(&events(), Some(Montreal), now).unwrap();
    assert_eq!(report.checked, 3);
    assert_eq!(report.archivable, vec!["test.open511.org/finished"]);
}

#[test]
fn sweep_uses_each_schedules_own_timezone() {
    // 17:30 UTC is 09:30 in Vancouver: the one-off is over.
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 17, 30, 0).unwrap();
    let report = find_archivable(&events(), Some(Montreal), now).unwrap();
    assert_eq!(
        report.archivable,
        vec!["test.open511.org/finished", "test.open511.org/one-off"]
    );
}

#[test]
fn sweep_names_the_failing_event() {
    let events: Vec<RoadEventDocument> = serde_json::from_str(
        r#"[{"id": "test.open511.org/no-zone", "schedule": {"schedules": [{"start_date": "2026-01-01"}]}}]"#,
    )
    .unwrap();
    let err = find_archivable(&events, None, Utc::now()).unwrap_err();
    match err {
        ScheduleError::Event { id, source } => {
            assert_eq!(id, "test.open511.org/no-zone");
            assert!(matches!(*source, ScheduleError::MissingTimezone));
        }
        other => panic!("expected Event error, got {:?}", other),
    }
}
