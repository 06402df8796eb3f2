//! # road-schedule
//!
//! Schedule evaluation for road events (closures, construction, incidents).
//!
//! A road event's schedule is a set of weekly-recurring components (date
//! range, weekdays, daily windows) plus date-specific exceptions that
//! override the recurring pattern on their date. This crate answers the
//! questions the events API and the archival job ask of it: is the event
//! active at an instant, is it active at any point in a window, and does it
//! have any occurrences left. Calendar dates are generated with the `rrule`
//! crate; wall-clock times are placed with `chrono-tz`.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::TimeZone;
//! use chrono_tz::America::Montreal;
//! use road_schedule::Schedule;
//!
//! let schedule = Schedule::from_json(
//!     r#"{"schedules": [{
//!         "start_date": "2026-03-02",
//!         "days": [1, 2, 3, 4, 5],
//!         "daily_periods": [{"start": "09:00", "end": "17:00"}]
//!     }]}"#,
//!     Some(Montreal),
//! )
//! .unwrap();
//!
//! // Monday 2026-03-02, 09:30 in Montreal is 14:30 UTC.
//! assert!(schedule.includes(chrono::Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap()));
//! ```
//!
//! ## Modules
//!
//! - [`schedule`]: `Schedule`: components + exceptions, the three queries
//! - [`recurring`]: `RecurringSchedule`: one weekly pattern and its expansion
//! - [`period`]: `Period` (time-of-day window) and `Interval` (expanded form)
//! - [`document`]: serde representation consumed at construction
//! - [`timezone`]: embedded zone vs. jurisdiction fallback
//! - [`dst`]: DST transition policies
//! - [`text`]: date/time token parsing
//! - [`filter`]: the `in_effect_on` API filter, with its range cap
//! - [`sweep`]: archival sweep over road events
//! - [`error`]: Error types

pub mod document;
pub mod dst;
pub mod error;
pub mod filter;
pub mod period;
pub mod recurring;
pub mod schedule;
pub mod sweep;
pub mod text;
pub mod timezone;

pub use document::{PeriodDocument, RoadEventDocument, ScheduleDocument, ScheduleEntry};
pub use dst::DstPolicy;
pub use error::ScheduleError;
pub use filter::{FilterConfig, InEffectOn};
pub use period::{Interval, Period};
pub use recurring::RecurringSchedule;
pub use schedule::{Moment, Schedule};
pub use sweep::{find_archivable, SweepReport};
pub use timezone::resolve_timezone;
