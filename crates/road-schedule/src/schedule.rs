//! Schedules: recurring components unioned, with date-specific exceptions
//! taking precedence.
//!
//! An exception date fully replaces the recurring pattern on that date. An
//! exception with no periods means the event is explicitly off all day; an
//! exception with periods means only those periods apply, even if a
//! recurring window would otherwise cover the queried time.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::document::ScheduleDocument;
use crate::dst::{self, DstPolicy};
use crate::error::{Result, ScheduleError};
use crate::period::{Interval, Period};
use crate::recurring::RecurringSchedule;
use crate::text::parse_exception_entry;
use crate::timezone::resolve_timezone;

/// Occurrences generated per component when checking for remaining periods.
/// Two is enough for a weekly pattern: if today's last window is over, the
/// next matching date is still ahead.
const REMAINING_LOOKAHEAD: u32 = 2;

/// Days checked before falling back to a full lookahead expansion.
pub const NEAR_WINDOW_DAYS: u64 = 14;

/// A point in time handed to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    /// An instant; converted into the schedule's zone before evaluation.
    Aware(DateTime<Utc>),
    /// A wall-clock reading, taken to be in the schedule's zone already.
    Naive(NaiveDateTime),
    /// A whole day, with no time of day.
    Date(NaiveDate),
}

impl<Z: TimeZone> From<DateTime<Z>> for Moment {
    fn from(dt: DateTime<Z>) -> Self {
        Moment::Aware(dt.with_timezone(&Utc))
    }
}

impl From<NaiveDateTime> for Moment {
    fn from(dt: NaiveDateTime) -> Self {
        Moment::Naive(dt)
    }
}

impl From<NaiveDate> for Moment {
    fn from(date: NaiveDate) -> Self {
        Moment::Date(date)
    }
}

/// A road event's full schedule, evaluated in a single time zone.
///
/// Built once from a document and then only queried. Cheap to rebuild, so
/// callers construct one per evaluation rather than caching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    recurring: Vec<RecurringSchedule>,
    exceptions: BTreeMap<NaiveDate, Vec<Period>>,
    timezone: Tz,
    dst_policy: DstPolicy,
}

impl Schedule {
    /// An empty schedule, never active.
    pub fn new(timezone: Tz) -> Self {
        Self {
            recurring: Vec::new(),
            exceptions: BTreeMap::new(),
            timezone,
            dst_policy: DstPolicy::default(),
        }
    }

    /// Build a schedule from its document.
    ///
    /// `fallback` is the owning jurisdiction's default zone, used when the
    /// document names none. Entries without a `start_date` add no recurring
    /// component, but their `specific_dates` still count. Exception periods
    /// for a repeated date are appended in declaration order.
    ///
    /// # Errors
    /// Returns `ScheduleError::MissingTimezone` / `InvalidTimezone` when the
    /// zone cannot be resolved, and the parse error for any malformed field.
    pub fn from_document(doc: &ScheduleDocument, fallback: Option<Tz>) -> Result<Self> {
        let timezone = resolve_timezone(doc.timezone.as_deref(), fallback)?;

        let recurring = doc
            .schedules
            .iter()
            .filter(|entry| entry.start_date.is_some())
            .map(|entry| RecurringSchedule::from_entry(entry, timezone))
            .collect::<Result<Vec<_>>>()?;

        let mut exceptions: BTreeMap<NaiveDate, Vec<Period>> = BTreeMap::new();
        for token in doc.schedules.iter().flat_map(|e| e.specific_dates.iter()) {
            let (date, periods) = parse_exception_entry(token)?;
            exceptions.entry(date).or_default().extend(periods);
        }

        tracing::debug!(
            %timezone,
            components = recurring.len(),
            exceptions = exceptions.len(),
            "built schedule"
        );

        Ok(Self {
            recurring,
            exceptions,
            timezone,
            dst_policy: DstPolicy::default(),
        })
    }

    /// Parse a JSON document and build a schedule from it.
    ///
    /// # Errors
    /// See [`ScheduleDocument::from_json`] and [`Schedule::from_document`].
    pub fn from_json(json: &str, fallback: Option<Tz>) -> Result<Self> {
        Self::from_document(&ScheduleDocument::from_json(json)?, fallback)
    }

    /// Add a recurring component. It is evaluated in this schedule's zone and
    /// DST policy regardless of how it was built.
    pub fn with_recurring(mut self, component: RecurringSchedule) -> Self {
        self.recurring.push(
            component
                .in_timezone(self.timezone)
                .with_dst_policy(self.dst_policy),
        );
        self
    }

    /// Add exception periods for `date`, appending to any already present.
    /// An empty list marks the date as explicitly inactive.
    pub fn with_exception(mut self, date: NaiveDate, periods: Vec<Period>) -> Self {
        self.exceptions.entry(date).or_default().extend(periods);
        self
    }

    /// Change how nonexistent or ambiguous local times are placed.
    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self.recurring = self
            .recurring
            .into_iter()
            .map(|component| component.with_dst_policy(policy))
            .collect();
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn dst_policy(&self) -> DstPolicy {
        self.dst_policy
    }

    pub fn recurring_schedules(&self) -> &[RecurringSchedule] {
        &self.recurring
    }

    pub fn exceptions(&self) -> &BTreeMap<NaiveDate, Vec<Period>> {
        &self.exceptions
    }

    /// Is the event active at `at`?
    ///
    /// Aware instants are converted into the schedule's zone; naive datetimes
    /// are read as already local. On an exception date only the exception's
    /// periods are consulted. A date-only query on an exception date is true.
    pub fn includes(&self, at: impl Into<Moment>) -> bool {
        let (date, time) = self.local_parts(at.into());

        if let Some(periods) = self.exceptions.get(&date) {
            return match time {
                None => true,
                Some(time) => periods.iter().any(|p| p.contains(time)),
            };
        }

        self.recurring.iter().any(|r| r.includes(date, time))
    }

    /// Is the event active at any point between `start` and `end`?
    ///
    /// Expands the schedule over the dates spanned by the window and looks
    /// for a period that contains the window or has an endpoint inside it
    /// (inclusive). A date-only `start` means the start of that day and a
    /// date-only `end` the end of it.
    ///
    /// The cost grows with the window; callers that take windows from users
    /// should cap them first (see [`crate::filter`]).
    ///
    /// # Errors
    /// Propagates expansion errors from [`Schedule::to_periods`].
    pub fn active_within_range(
        &self,
        start: impl Into<Moment>,
        end: impl Into<Moment>,
    ) -> Result<bool> {
        let start = self.to_instant(start.into(), NaiveTime::default())?;
        let end = self.to_instant(end.into(), end_of_day())?;

        let periods = self.to_periods(None, Some(start.date_naive()), Some(end.date_naive()))?;
        Ok(periods.iter().any(|p| p.overlaps(&start, &end)))
    }

    /// All active intervals between `range_start` and `range_end` (inclusive
    /// dates), sorted by start.
    ///
    /// Exception dates in range contribute their own periods and suppress any
    /// recurring interval on the same date. `infinite_limit` is handed to
    /// each component; a component bounded by its own end date or by
    /// `range_end` ignores it.
    ///
    /// # Errors
    /// Returns `ScheduleError::UnboundedExpansion` if some component has no
    /// end date and neither `range_end` nor `infinite_limit` is given.
    pub fn to_periods(
        &self,
        infinite_limit: Option<u32>,
        range_start: Option<NaiveDate>,
        range_end: Option<NaiveDate>,
    ) -> Result<Vec<Interval>> {
        let in_range = |date: &NaiveDate| {
            range_start.map_or(true, |start| *date >= start)
                && range_end.map_or(true, |end| *date <= end)
        };

        let mut periods: Vec<Interval> = self
            .exceptions
            .iter()
            .filter(|(date, _)| in_range(date))
            .flat_map(|(date, periods)| {
                periods
                    .iter()
                    .filter_map(move |period| self.localize(*date, period))
            })
            .collect();

        for component in &self.recurring {
            let expanded = component.to_periods(infinite_limit, range_start, range_end)?;
            periods.extend(
                expanded
                    .into_iter()
                    .filter(|interval| !self.exceptions.contains_key(&interval.start.date_naive())),
            );
        }

        periods.sort();
        Ok(periods)
    }

    /// Does the schedule have any period ending after the current time?
    ///
    /// # Errors
    /// Propagates expansion errors.
    pub fn has_remaining_periods(&self) -> Result<bool> {
        self.has_remaining_periods_at(Utc::now())
    }

    /// [`Schedule::has_remaining_periods`] evaluated at `now`.
    ///
    /// The next [`NEAR_WINDOW_DAYS`] are checked first. Only when nothing is
    /// left there does it expand further, and then a component with a distant
    /// end date is expanded all the way to that date.
    ///
    /// # Errors
    /// Propagates expansion errors.
    pub fn has_remaining_periods_at(&self, now: DateTime<Utc>) -> Result<bool> {
        let now = now.with_timezone(&self.timezone);
        let today = now.date_naive();

        let near_end = today
            .checked_add_days(Days::new(NEAR_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MAX);
        let near = self.to_periods(None, Some(today), Some(near_end))?;
        if near.iter().any(|p| p.end > now) {
            return Ok(true);
        }

        // Each exception from today on can claim one of the lookahead dates.
        let claimed = u32::try_from(self.exceptions.range(today..).count()).unwrap_or(u32::MAX);
        let lookahead = REMAINING_LOOKAHEAD.saturating_add(claimed);
        let periods = self.to_periods(Some(lookahead), Some(today), None)?;
        Ok(periods.iter().any(|p| p.end > now))
    }

    fn local_parts(&self, moment: Moment) -> (NaiveDate, Option<NaiveTime>) {
        match moment {
            Moment::Aware(dt) => {
                let local = dt.with_timezone(&self.timezone).naive_local();
                (local.date(), Some(local.time()))
            }
            Moment::Naive(dt) => (dt.date(), Some(dt.time())),
            Moment::Date(date) => (date, None),
        }
    }

    fn to_instant(&self, moment: Moment, day_time: NaiveTime) -> Result<DateTime<Tz>> {
        let local = match moment {
            Moment::Aware(dt) => return Ok(dt.with_timezone(&self.timezone)),
            Moment::Naive(dt) => dt,
            Moment::Date(date) => date.and_time(day_time),
        };
        dst::localize(&self.timezone, local, DstPolicy::WallClock).ok_or_else(|| {
            ScheduleError::Expansion(format!("cannot place {} in {}", local, self.timezone))
        })
    }

    fn localize(&self, date: NaiveDate, period: &Period) -> Option<Interval> {
        Some(Interval {
            start: dst::localize(&self.timezone, date.and_time(period.start), self.dst_policy)?,
            end: dst::localize(&self.timezone, date.and_time(period.end), self.dst_policy)?,
        })
    }
}

pub(crate) fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()
}
