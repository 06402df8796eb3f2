//! Recurring schedule components: one weekly pattern (date range, weekdays,
//! daily windows) and its expansion into concrete intervals.
//!
//! Calendar dates are generated by the `rrule` crate as a `FREQ=DAILY` rule
//! filtered by `BYDAY`, evaluated in UTC so that only the date arithmetic is
//! delegated. Each date is then combined with the daily windows and localized
//! into the schedule's zone under the configured [`DstPolicy`].

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::document::ScheduleEntry;
use crate::dst::{self, DstPolicy};
use crate::error::{Result, ScheduleError};
use crate::period::{Interval, Period};
use crate::text::{parse_date, parse_time};

const BYDAY: [&str; 7] = ["MO", "TU", "WE", "TH", "FR", "SA", "SU"];

// Dates requested from the rrule crate per call; `all()` takes a u16 limit.
const CHUNK: u16 = 10_000;

/// How far an expansion runs when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    /// Through this date, inclusive.
    Until(NaiveDate),
    /// This many matching dates.
    Count(u32),
}

/// One weekly-recurrence rule.
///
/// Immutable once built; every query is a pure function of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringSchedule {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    /// 0 = Monday .. 6 = Sunday
    weekdays: BTreeSet<u32>,
    daily_periods: Vec<Period>,
    timezone: Tz,
    dst_policy: DstPolicy,
}

impl RecurringSchedule {
    /// An open-ended, every-day, all-day component in `timezone`.
    pub fn new(timezone: Tz) -> Self {
        Self {
            start_date: None,
            end_date: None,
            weekdays: (0..7).collect(),
            daily_periods: vec![Period::all_day()],
            timezone,
            dst_policy: DstPolicy::default(),
        }
    }

    /// Build a component from a document entry.
    ///
    /// Missing fields take their defaults: every weekday, one all-day period.
    /// `daily_periods` wins over the older `start_time`/`end_time` pair.
    ///
    /// # Errors
    /// Returns the parse error for any malformed date, time, or weekday.
    pub fn from_entry(entry: &ScheduleEntry, timezone: Tz) -> Result<Self> {
        let start_date = entry.start_date.as_deref().map(parse_date).transpose()?;
        let end_date = entry.end_date.as_deref().map(parse_date).transpose()?;

        let weekdays = match &entry.days {
            None => (0..7).collect(),
            Some(days) => days
                .iter()
                .map(|&day| match day {
                    1..=7 => Ok((day - 1) as u32),
                    other => Err(ScheduleError::InvalidWeekday(other)),
                })
                .collect::<Result<BTreeSet<u32>>>()?,
        };

        let daily_periods = match (&entry.daily_periods, &entry.start_time) {
            (Some(periods), _) if !periods.is_empty() => periods
                .iter()
                .map(|p| Ok(Period::new(parse_time(&p.start)?, parse_time(&p.end)?)))
                .collect::<Result<Vec<_>>>()?,
            (_, Some(start)) => {
                let end = entry.end_time.as_deref().ok_or_else(|| {
                    ScheduleError::InvalidPeriod(format!("start_time {} has no end_time", start))
                })?;
                vec![Period::new(parse_time(start)?, parse_time(end)?)]
            }
            _ => vec![Period::all_day()],
        };

        Ok(Self {
            start_date,
            end_date,
            weekdays,
            daily_periods,
            timezone,
            dst_policy: DstPolicy::default(),
        })
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Set the active weekdays, 0 = Monday .. 6 = Sunday. Values above 6 are dropped.
    pub fn with_weekdays(mut self, weekdays: impl IntoIterator<Item = u32>) -> Self {
        self.weekdays = weekdays.into_iter().filter(|&d| d < 7).collect();
        self
    }

    /// Replace the daily windows. An empty list falls back to all day.
    pub fn with_daily_periods(mut self, periods: Vec<Period>) -> Self {
        self.daily_periods = if periods.is_empty() {
            vec![Period::all_day()]
        } else {
            periods
        };
        self
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    pub(crate) fn in_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn weekdays(&self) -> &BTreeSet<u32> {
        &self.weekdays
    }

    pub fn daily_periods(&self) -> &[Period] {
        &self.daily_periods
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Is this component active on `date` (and at `time`, when given)?
    ///
    /// `date` and `time` are wall-clock values in the component's zone. A
    /// date-only query is true once the date range and weekday checks pass.
    pub fn includes(&self, date: NaiveDate, time: Option<NaiveTime>) -> bool {
        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }
        if !self.weekdays.contains(&date.weekday().num_days_from_monday()) {
            return false;
        }
        match time {
            None => true,
            Some(time) => self.daily_periods.iter().any(|p| p.contains(time)),
        }
    }

    /// Expand into concrete intervals, ordered by date then by daily window.
    ///
    /// Generation starts at the later of `range_start` and the component's
    /// start date. It stops at the earlier of `range_end` and the end date;
    /// with neither, after `infinite_limit` matching dates (each date yields
    /// one interval per daily window).
    ///
    /// # Errors
    /// Returns `ScheduleError::UnboundedExpansion` when no end date, range end,
    /// or limit bounds the expansion, and `ScheduleError::MissingStart` when
    /// neither a start date nor a range start is known.
    pub fn to_periods(
        &self,
        infinite_limit: Option<u32>,
        range_start: Option<NaiveDate>,
        range_end: Option<NaiveDate>,
    ) -> Result<Vec<Interval>> {
        let from = match (range_start, self.start_date) {
            (Some(a), Some(b)) => a.max(b),
            (Some(d), None) | (None, Some(d)) => d,
            (None, None) => return Err(ScheduleError::MissingStart),
        };

        let bound = match (self.end_date, range_end, infinite_limit) {
            (Some(end), Some(range_end), _) => Bound::Until(end.min(range_end)),
            (Some(end), None, _) | (None, Some(end), _) => Bound::Until(end),
            (None, None, Some(limit)) => Bound::Count(limit),
            (None, None, None) => return Err(ScheduleError::UnboundedExpansion),
        };

        let dates = self.recurrence_dates(from, bound)?;
        tracing::debug!(?from, ?bound, dates = dates.len(), "expanded recurring schedule");

        Ok(dates
            .into_iter()
            .flat_map(|date| {
                self.daily_periods
                    .iter()
                    .filter_map(move |period| self.localize(date, period))
            })
            .collect())
    }

    fn localize(&self, date: NaiveDate, period: &Period) -> Option<Interval> {
        Some(Interval {
            start: dst::localize(&self.timezone, date.and_time(period.start), self.dst_policy)?,
            end: dst::localize(&self.timezone, date.and_time(period.end), self.dst_policy)?,
        })
    }

    /// Dates on or after `from` that fall on one of the weekdays.
    fn recurrence_dates(&self, from: NaiveDate, bound: Bound) -> Result<Vec<NaiveDate>> {
        if self.weekdays.is_empty() {
            return Ok(Vec::new());
        }

        let byday = self
            .weekdays
            .iter()
            .filter_map(|&d| BYDAY.get(d as usize).copied())
            .collect::<Vec<_>>()
            .join(",");

        let mut dates: Vec<NaiveDate> = Vec::new();
        let mut cursor = from;

        loop {
            let (rule, limit) = match bound {
                Bound::Until(until) => {
                    if cursor > until {
                        break;
                    }
                    (
                        format!(
                            "FREQ=DAILY;BYDAY={};UNTIL={}T000000Z",
                            byday,
                            until.format("%Y%m%d")
                        ),
                        CHUNK,
                    )
                }
                Bound::Count(count) => {
                    let remaining = (count as usize).saturating_sub(dates.len());
                    if remaining == 0 {
                        break;
                    }
                    let limit = u16::try_from(remaining).unwrap_or(CHUNK).min(CHUNK);
                    (format!("FREQ=DAILY;BYDAY={};COUNT={}", byday, limit), limit)
                }
            };

            // UNTIL carries a trailing Z, so DTSTART must be UTC as well.
            let rrule_text = format!(
                "DTSTART;TZID=UTC:{}T000000\nRRULE:{}",
                cursor.format("%Y%m%d"),
                rule
            );
            let rrule_set: RRuleSet = rrule_text
                .parse()
                .map_err(|e| ScheduleError::Expansion(format!("{}", e)))?;

            let chunk: Vec<NaiveDate> = rrule_set
                .all(limit)
                .dates
                .into_iter()
                .map(|dt| dt.date_naive())
                .collect();

            let exhausted = chunk.len() < usize::from(limit);
            match chunk.last() {
                Some(last) => cursor = *last + Duration::days(1),
                None => break,
            }
            dates.extend(chunk);
            if exhausted && matches!(bound, Bound::Until(_)) {
                break;
            }
        }

        Ok(dates)
    }
}
