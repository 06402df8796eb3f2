//! The `in_effect_on` list filter, as exposed by the events API.
//!
//! `now` asks whether an event is active at the current instant, a single
//! instant asks the same about that instant, and `start,end` asks whether the
//! event is active at any point in the window. Windows are capped (40 days by
//! default) before any expansion happens; the schedule itself imposes no cap.

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};

use crate::error::{Result, ScheduleError};
use crate::schedule::{end_of_day, Moment, Schedule};
use crate::text::parse_moment;

pub const DEFAULT_MAX_RANGE_DAYS: i64 = 40;

/// Limits applied by the filter before it touches a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    pub max_range_days: i64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

/// A parsed `in_effect_on` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InEffectOn {
    Now,
    At(Moment),
    Between(Moment, Moment),
}

impl FromStr for InEffectOn {
    type Err = ScheduleError;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ScheduleError::InvalidFilter("empty value".to_string()));
        }
        if value.eq_ignore_ascii_case("now") {
            return Ok(InEffectOn::Now);
        }
        let parse = |s: &str| {
            parse_moment(s).map_err(|_| ScheduleError::InvalidFilter(format!("bad instant '{}'", s)))
        };
        match value.split_once(',') {
            // "start," with nothing after the comma is a single instant.
            Some((start, end)) if end.trim().is_empty() => Ok(InEffectOn::At(parse(start)?)),
            Some((start, end)) => Ok(InEffectOn::Between(parse(start)?, parse(end)?)),
            None => Ok(InEffectOn::At(parse(value)?)),
        }
    }
}

impl InEffectOn {
    /// Reject windows that are inverted or longer than the configured cap.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidFilter` for an inverted window and
    /// `ScheduleError::RangeTooLarge` for one over `max_range_days`.
    pub fn validate(&self, config: &FilterConfig) -> Result<()> {
        let InEffectOn::Between(start, end) = self else {
            return Ok(());
        };
        let span =
            approximate(*end, end_of_day()) - approximate(*start, NaiveTime::default());
        if span < Duration::zero() {
            return Err(ScheduleError::InvalidFilter(
                "range end is before range start".to_string(),
            ));
        }
        if span > Duration::days(config.max_range_days) {
            let whole = span.num_days();
            let days = if span > Duration::days(whole) { whole + 1 } else { whole };
            return Err(ScheduleError::RangeTooLarge {
                days,
                max_days: config.max_range_days,
            });
        }
        Ok(())
    }

    /// Validate, then evaluate against `schedule` with `now` as the current
    /// instant.
    ///
    /// # Errors
    /// Validation errors, plus any expansion error from the schedule.
    pub fn matches(
        &self,
        schedule: &Schedule,
        config: &FilterConfig,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.validate(config)?;
        match *self {
            InEffectOn::Now => Ok(schedule.includes(now)),
            InEffectOn::At(at) => Ok(schedule.includes(at)),
            InEffectOn::Between(start, end) => schedule.active_within_range(start, end),
        }
    }
}

// Good enough for the size cap; zone offsets are at most a day. Date-only
// bounds take the same time of day `active_within_range` gives them.
fn approximate(moment: Moment, day_time: NaiveTime) -> NaiveDateTime {
    match moment {
        Moment::Aware(dt) => dt.naive_utc(),
        Moment::Naive(dt) => dt,
        Moment::Date(date) => date.and_time(day_time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn parses_now() {
        assert_eq!("now".parse::<InEffectOn>().unwrap(), InEffectOn::Now);
        assert_eq!(" NOW ".parse::<InEffectOn>().unwrap(), InEffectOn::Now);
    }

    #[test]
    fn parses_single_instant() {
        let parsed: InEffectOn = "2026-03-02T14:00:00Z".parse().unwrap();
        assert_eq!(
            parsed,
            InEffectOn::At(Moment::Aware(
                Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap()
            ))
        );
        let trailing_comma: InEffectOn = "2026-03-02,".parse().unwrap();
        assert_eq!(
            trailing_comma,
            InEffectOn::At(Moment::Date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()))
        );
    }

    #[test]
    fn parses_range() {
        let parsed: InEffectOn = "2026-03-01,2026-03-10".parse().unwrap();
        assert!(matches!(
            parsed,
            InEffectOn::Between(Moment::Date(_), Moment::Date(_))
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "".parse::<InEffectOn>(),
            Err(ScheduleError::InvalidFilter(_))
        ));
        assert!(matches!(
            "tomorrow".parse::<InEffectOn>(),
            Err(ScheduleError::InvalidFilter(_))
        ));
        assert!(matches!(
            "2026-03-01,later".parse::<InEffectOn>(),
            Err(ScheduleError::InvalidFilter(_))
        ));
    }

    #[test]
    fn forty_days_is_allowed_forty_one_is_not() {
        let config = FilterConfig::default();
        let ok: InEffectOn = "2026-03-01,2026-04-09".parse().unwrap();
        assert!(ok.validate(&config).is_ok());

        // A date-only end runs to the end of that day, so this window spans
        // 40 days and 23:59:59.
        let too_long: InEffectOn = "2026-03-01,2026-04-10".parse().unwrap();
        assert!(matches!(
            too_long.validate(&config),
            Err(ScheduleError::RangeTooLarge {
                days: 41,
                max_days: 40
            })
        ));

        let just_over: InEffectOn = "2026-03-01T00:00:00Z,2026-04-10T00:00:01Z".parse().unwrap();
        assert!(matches!(
            just_over.validate(&config),
            Err(ScheduleError::RangeTooLarge { days: 41, .. })
        ));
    }

    #[test]
    fn date_end_is_measured_to_end_of_day() {
        let config = FilterConfig { max_range_days: 1 };
        let same_day: InEffectOn = "2026-03-01,2026-03-01".parse().unwrap();
        assert!(same_day.validate(&config).is_ok());
        let next_day: InEffectOn = "2026-03-01,2026-03-02".parse().unwrap();
        assert!(matches!(
            next_day.validate(&config),
            Err(ScheduleError::RangeTooLarge { days: 2, .. })
        ));
        let naive_end: InEffectOn = "2026-03-01,2026-03-02T00:00".parse().unwrap();
        assert!(naive_end.validate(&config).is_ok());
    }

    #[test]
    fn cap_is_configurable() {
        let config = FilterConfig { max_range_days: 7 };
        let value: InEffectOn = "2026-03-01,2026-03-09".parse().unwrap();
        assert!(value.validate(&config).is_err());
        assert!(value.validate(&FilterConfig::default()).is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let value: InEffectOn = "2026-03-09,2026-03-01".parse().unwrap();
        assert!(matches!(
            value.validate(&FilterConfig::default()),
            Err(ScheduleError::InvalidFilter(_))
        ));
    }
}
