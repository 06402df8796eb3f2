//! Text parsing helpers for the date, time and period tokens found in
//! schedule documents and query strings.
//!
//! Failures surface as [`ScheduleError`] parse variants; nothing here
//! substitutes a default for malformed input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Result, ScheduleError};
use crate::period::Period;
use crate::schedule::Moment;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(s.to_string()))
}

/// Parse an `HH:MM` wall-clock time. `HH:MM:SS` is accepted too.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| ScheduleError::InvalidTime(s.to_string()))
}

/// Parse an `HH:MM-HH:MM` time range token.
pub fn parse_time_range(s: &str) -> Result<Period> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| ScheduleError::InvalidPeriod(s.to_string()))?;
    Ok(Period::new(parse_time(start)?, parse_time(end)?))
}

/// Parse one exception entry: a date followed by zero or more
/// space-separated time ranges, e.g. `"2026-03-14 09:00-12:00 13:00-17:00"`.
///
/// An entry with no ranges yields an empty list, meaning the date is
/// explicitly inactive.
pub fn parse_exception_entry(s: &str) -> Result<(NaiveDate, Vec<Period>)> {
    let mut tokens = s.split_whitespace();
    let date = tokens
        .next()
        .ok_or_else(|| ScheduleError::InvalidDate(s.to_string()))
        .and_then(parse_date)?;
    let periods = tokens.map(parse_time_range).collect::<Result<Vec<_>>>()?;
    Ok((date, periods))
}

/// Parse a query instant.
///
/// RFC 3339 strings (with an offset) become aware moments; datetimes without
/// an offset are naive and read as schedule-local; a bare date is a date-only
/// query.
pub fn parse_moment(s: &str) -> Result<Moment> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Moment::from(dt));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Ok(Moment::from(dt));
    }
    if let Some(ndt) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(Moment::Naive(ndt));
    }
    parse_date(s).map(Moment::Date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn dates() {
        assert_eq!(
            parse_date("2026-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert!(matches!(
            parse_date("2026-13-01"),
            Err(ScheduleError::InvalidDate(_))
        ));
        assert!(parse_date("").is_err());
    }

    #[test]
    fn times() {
        assert_eq!(parse_time("09:30").unwrap(), t(9, 30));
        assert_eq!(parse_time("23:59:00").unwrap(), t(23, 59));
        assert!(matches!(parse_time("25:00"), Err(ScheduleError::InvalidTime(_))));
        assert!(parse_time("nine").is_err());
    }

    #[test]
    fn ranges() {
        assert_eq!(
            parse_time_range("22:00-23:00").unwrap(),
            Period::new(t(22, 0), t(23, 0))
        );
        assert!(matches!(
            parse_time_range("22:00"),
            Err(ScheduleError::InvalidPeriod(_))
        ));
        assert!(matches!(
            parse_time_range("22:00-xx"),
            Err(ScheduleError::InvalidTime(_))
        ));
    }

    #[test]
    fn exception_entries() {
        let (date, periods) = parse_exception_entry("2026-03-14 09:00-12:00 13:00-17:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        assert_eq!(
            periods,
            vec![Period::new(t(9, 0), t(12, 0)), Period::new(t(13, 0), t(17, 0))]
        );

        let (_, periods) = parse_exception_entry("  2026-03-14  ").unwrap();
        assert!(periods.is_empty());

        assert!(parse_exception_entry("").is_err());
        assert!(parse_exception_entry("2026-03-14 9-5").is_err());
    }

    #[test]
    fn moments() {
        match parse_moment("2026-03-02T14:30:00Z").unwrap() {
            Moment::Aware(dt) => {
                assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap())
            }
            other => panic!("expected aware moment, got {:?}", other),
        }
        match parse_moment("2026-03-02T09:30-05:00").unwrap() {
            Moment::Aware(dt) => {
                assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap())
            }
            other => panic!("expected aware moment, got {:?}", other),
        }
        assert!(matches!(
            parse_moment("2026-03-02T09:30").unwrap(),
            Moment::Naive(_)
        ));
        assert!(matches!(
            parse_moment("2026-03-02 09:30:15").unwrap(),
            Moment::Naive(_)
        ));
        assert!(matches!(parse_moment("2026-03-02").unwrap(), Moment::Date(_)));
        assert!(parse_moment("yesterday").is_err());
    }
}
