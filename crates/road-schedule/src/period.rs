//! Time-of-day periods and their expanded, timezone-aware form.

use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;

/// A daily active window in wall-clock time, with no timezone attached.
///
/// Bounds are inclusive. `start <= end` is not enforced: an inverted period
/// (meant to cross midnight, e.g. 22:00-02:00) never contains any time, so
/// daily periods must not cross midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Period {
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// 00:00-23:59, used when a recurring entry declares no daily times.
    pub fn all_day() -> Self {
        Self {
            start: NaiveTime::default(),
            end: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default(),
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::all_day()
    }
}

/// One concrete occurrence: a [`Period`] placed on a calendar date and
/// localized into the schedule's timezone.
///
/// Ordering is by `start`, then `end`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Interval {
    /// Does this interval touch `[query_start, query_end]`?
    ///
    /// True when the interval strictly contains the query window, or when
    /// either of its endpoints lands inside the window (inclusive).
    pub fn overlaps(&self, query_start: &DateTime<Tz>, query_end: &DateTime<Tz>) -> bool {
        (self.start < *query_start && self.end > *query_end)
            || (*query_start <= self.start && self.start <= *query_end)
            || (*query_start <= self.end && self.end <= *query_end)
    }
}
