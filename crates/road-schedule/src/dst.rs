//! DST transition policies for placing wall-clock times on a calendar date.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;

/// Policy for local times that fall in a DST transition.
///
/// Ambiguous times (the repeated hour when clocks fall back) always resolve
/// to the earlier instant. The policies differ only for nonexistent times
/// (the skipped hour when clocks spring forward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Drop intervals whose start or end falls in the DST gap.
    Skip,
    /// Move to the first valid instant after the gap.
    ShiftForward,
    /// Keep the wall-clock reading and apply the offset in effect before the gap.
    #[default]
    WallClock,
}

// Longest DST gap in the tz database is two hours; leave room.
const MAX_GAP_MINUTES: i64 = 4 * 60;

/// Localize a naive wall-clock datetime into `tz` according to `policy`.
///
/// Returns `None` only under [`DstPolicy::Skip`] for a nonexistent local time.
pub fn localize(tz: &Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => match policy {
            DstPolicy::Skip => {
                tracing::warn!(%local, %tz, "skipping nonexistent local time");
                None
            }
            DstPolicy::ShiftForward => {
                let shifted = shift_forward(tz, local);
                tracing::debug!(%local, %tz, "shifted nonexistent local time past the gap");
                shifted
            }
            DstPolicy::WallClock => Some(with_offset_before_gap(tz, local)),
        },
    }
}

fn shift_forward(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    (1..=MAX_GAP_MINUTES).find_map(|minutes| {
        tz.from_local_datetime(&(local + Duration::minutes(minutes)))
            .earliest()
    })
}

fn with_offset_before_gap(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    // The wall clock a few hours earlier is valid and carries the pre-gap offset.
    let before = local - Duration::minutes(MAX_GAP_MINUTES);
    let offset = tz
        .offset_from_local_datetime(&before)
        .earliest()
        .unwrap_or_else(|| tz.offset_from_utc_datetime(&before))
        .fix();
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    tz.from_utc_datetime(&utc)
}
