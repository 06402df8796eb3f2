//! Archival sweep: find active road events with nothing left on their
//! schedule. What to do with them (usually clearing the active flag) is up to
//! the caller.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::document::RoadEventDocument;
use crate::error::{Result, ScheduleError};
use crate::schedule::Schedule;

/// Result of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Active events whose schedules were evaluated.
    pub checked: usize,
    /// Ids of active events with no remaining periods, in input order.
    pub archivable: Vec<String>,
}

/// Evaluate every active event at `now`. Inactive events are skipped.
///
/// `fallback` is the jurisdiction default zone for schedules that name none.
///
/// # Errors
/// The first failing event aborts the sweep with `ScheduleError::Event`,
/// naming the event.
pub fn find_archivable<'a>(
    events: impl IntoIterator<Item = &'a RoadEventDocument>,
    fallback: Option<Tz>,
    now: DateTime<Utc>,
) -> Result<SweepReport> {
    let mut report = SweepReport::default();

    for event in events.into_iter().filter(|e| e.active) {
        report.checked += 1;
        let remaining = Schedule::from_document(&event.schedule, fallback)
            .and_then(|schedule| schedule.has_remaining_periods_at(now))
            .map_err(|e| ScheduleError::Event {
                id: event.id.clone(),
                source: Box::new(e),
            })?;
        if !remaining {
            tracing::debug!(id = %event.id, "no remaining periods");
            report.archivable.push(event.id.clone());
        }
    }

    tracing::info!(
        checked = report.checked,
        archivable = report.archivable.len(),
        "archival sweep finished"
    );
    Ok(report)
}
