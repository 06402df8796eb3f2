//! The structured schedule representation, as delivered by importers and the
//! API layer.
//!
//! Documents are plain serde types. They are converted into typed
//! [`RecurringSchedule`](crate::recurring::RecurringSchedule) components and an
//! exception map exactly once, when a [`Schedule`](crate::schedule::Schedule)
//! is built; queries never look at the document again.
//!
//! ```json
//! {
//!   "timezone": "America/Montreal",
//!   "schedules": [
//!     {
//!       "start_date": "2026-03-01",
//!       "end_date": "2026-04-30",
//!       "days": [1, 2, 3, 4, 5],
//!       "daily_periods": [{ "start": "09:00", "end": "17:00" }],
//!       "specific_dates": ["2026-03-14 22:00-23:00", "2026-03-17"]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A schedule node: any number of recurring entries plus an optional zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    /// IANA zone name. When absent the jurisdiction default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
}

impl ScheduleDocument {
    /// Deserialize a document from JSON text.
    ///
    /// # Errors
    /// Returns `ScheduleError::Document` when the JSON is malformed or has the
    /// wrong shape.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One recurring-schedule sub-node.
///
/// Only entries with a `start_date` become recurring components; the
/// `specific_dates` of every entry feed the shared exception map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// 1 (Monday) to 7 (Sunday). `None` means every day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_periods: Option<Vec<PeriodDocument>>,
    /// Older single-window form, read only when `daily_periods` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Exception tokens: `"YYYY-MM-DD [HH:MM-HH:MM ...]"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specific_dates: Vec<String>,
}

/// A daily window, `HH:MM` to `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDocument {
    pub start: String,
    pub end: String,
}

/// A road event as seen by the archival sweep: an id, its editorial active
/// flag, and its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadEventDocument {
    pub id: String,
    #[serde(default = "default_active")]
    pub active: bool,
    pub schedule: ScheduleDocument,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScheduleError;

    #[test]
    fn empty_object_is_an_empty_document() {
        let doc = ScheduleDocument::from_json("{}").unwrap();
        assert_eq!(doc, ScheduleDocument::default());
    }

    #[test]
    fn full_document() {
        let doc = ScheduleDocument::from_json(
            r#"{
                "timezone": "America/Montreal",
                "schedules": [
                    {
                        "start_date": "2026-03-01",
                        "days": [1, 3, 5],
                        "daily_periods": [{"start": "09:00", "end": "17:00"}],
                        "specific_dates": ["2026-03-14"]
                    },
                    {"specific_dates": ["2026-03-20 22:00-23:00"]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.timezone.as_deref(), Some("America/Montreal"));
        assert_eq!(doc.schedules.len(), 2);
        assert_eq!(doc.schedules[0].days, Some(vec![1, 3, 5]));
        assert_eq!(doc.schedules[0].end_date, None);
        assert_eq!(doc.schedules[1].start_date, None);
        assert_eq!(doc.schedules[1].specific_dates, vec!["2026-03-20 22:00-23:00"]);
    }

    #[test]
    fn wrong_shape_is_a_document_error() {
        assert!(matches!(
            ScheduleDocument::from_json(r#"{"schedules": {"start_date": "2026-03-01"}}"#),
            Err(ScheduleError::Document(_))
        ));
        assert!(ScheduleDocument::from_json("not json").is_err());
    }

    #[test]
    fn road_event_active_defaults_to_true() {
        let ev: RoadEventDocument =
            serde_json::from_str(r#"{"id": "drivebc.ca/1", "schedule": {}}"#).unwrap();
        assert!(ev.active);
    }
}
