//! Time zone resolution.
//!
//! A schedule may embed its own IANA zone name; otherwise the owning
//! jurisdiction's default zone is used. There is no UTC default: a schedule
//! with neither is a configuration error.

use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};

/// Parse an IANA zone name such as `America/Montreal`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse()
        .map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}

/// Resolve the zone a schedule is evaluated in.
///
/// The embedded name wins when present and non-blank. An embedded name that
/// fails to parse is an error even when a fallback exists.
///
/// # Errors
/// Returns `ScheduleError::InvalidTimezone` for an unknown embedded name and
/// `ScheduleError::MissingTimezone` when neither side supplies a zone.
pub fn resolve_timezone(embedded: Option<&str>, fallback: Option<Tz>) -> Result<Tz> {
    match embedded.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => parse_timezone(name),
        None => fallback.ok_or(ScheduleError::MissingTimezone),
    }
}
