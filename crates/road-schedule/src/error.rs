//! Error types for schedule construction and evaluation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Neither the schedule nor its jurisdiction names a time zone.
    #[error("No timezone: the schedule has none and no fallback was provided")]
    MissingTimezone,

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Weekdays are numbered 1 (Monday) through 7 (Sunday) in documents.
    #[error("Invalid weekday: {0} (expected 1-7)")]
    InvalidWeekday(i64),

    #[error("Invalid schedule document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Unbounded expansion: neither an end date nor a limit was provided")]
    UnboundedExpansion,

    #[error("Unbounded expansion: neither a start date nor a range start was provided")]
    MissingStart,

    #[error("Expansion error: {0}")]
    Expansion(String),

    #[error("Invalid in_effect_on filter: {0}")]
    InvalidFilter(String),

    #[error("The in_effect_on filter can't handle ranges of more than {max_days} days (got {days})")]
    RangeTooLarge { days: i64, max_days: i64 },

    /// A failure while evaluating one road event during a sweep.
    #[error("Road event {id}: {source}")]
    Event {
        id: String,
        #[source]
        source: Box<ScheduleError>,
    },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
