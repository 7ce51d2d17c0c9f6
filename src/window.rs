//! Time-window resolution.
//!
//! Each target event maps 1:1 onto a `[start, end]` interval ending at its
//! cutoff: `start = cutoff - lookback`, or the minimum representable
//! timestamp when no lookback is given ("all history up to the cutoff").
//! Windows drive file selection and row filtering, then are discarded.

use chrono::{Duration, NaiveDateTime};

use crate::error::{AssemblyError, Result};
use crate::target::TargetEvent;

/// Interval of readings relevant to one target event. Both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub entity_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Resolve one window per target event, in input order. Pure, no I/O.
///
/// A lookback reaching past the representable range clamps to
/// `NaiveDateTime::MIN`.
pub fn resolve_windows(targets: &[TargetEvent], lookback: Option<Duration>) -> Vec<TimeWindow> {
    targets
        .iter()
        .map(|target| {
            let start = match lookback {
                Some(lb) => target
                    .cutoff_time
                    .checked_sub_signed(lb)
                    .unwrap_or(NaiveDateTime::MIN),
                None => NaiveDateTime::MIN,
            };
            TimeWindow {
                entity_id: target.entity_id.clone(),
                start,
                end: target.cutoff_time,
            }
        })
        .collect()
}

/// Parse a lookback expression such as `"30d"` into a duration.
///
/// Supported units: `s`/`sec`/`seconds`, `m`/`min`/`minutes`,
/// `h`/`hour`/`hours`, `d`/`day`/`days`, `w`/`week`/`weeks`.
///
/// ```
/// use chrono::Duration;
/// use dataset_assembler::window::parse_lookback;
///
/// assert_eq!(parse_lookback("30d").unwrap(), Duration::days(30));
/// assert_eq!(parse_lookback("45min").unwrap(), Duration::minutes(45));
/// ```
pub fn parse_lookback(expr: &str) -> Result<Duration> {
    let expr = expr.trim();
    let digits_end = expr
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(expr.len());
    let (number, unit) = expr.split_at(digits_end);
    let invalid = || AssemblyError::Lookback(expr.to_string());

    let count: i64 = number.parse().map_err(|_| invalid())?;
    let seconds_per_unit = match unit.trim() {
        "s" | "sec" | "seconds" => 1,
        "m" | "min" | "minutes" => 60,
        "h" | "hour" | "hours" => 3_600,
        "d" | "day" | "days" => 86_400,
        "w" | "week" | "weeks" => 604_800,
        _ => return Err(invalid()),
    };
    let total = count.checked_mul(seconds_per_unit).ok_or_else(invalid)?;
    Ok(Duration::seconds(total))
}

/// Union a window set into minimal disjoint intervals, sorted by start.
///
/// Row filtering against the merged set gives results identical to testing
/// every window, without the per-row-per-window scan.
pub fn merge_intervals(windows: &[TimeWindow]) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut intervals: Vec<(NaiveDateTime, NaiveDateTime)> =
        windows.iter().map(|w| (w.start, w.end)).collect();
    intervals.sort_unstable();

    let mut merged: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        match merged.last_mut() {
            // Endpoints are inclusive, so touching intervals fuse too.
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}
