//! Row filters: by signal membership, then by time window.
//!
//! Both filters only ever drop rows; they never reorder or duplicate. The
//! signal filter runs first so that rows it drops never have their
//! timestamps parsed.

use chrono::NaiveDateTime;
use log::debug;

use crate::error::{AssemblyError, Result};
use crate::ingest::{RawReading, READING_TIMESTAMP_FORMAT};
use crate::signals::SignalSet;
use crate::window::{merge_intervals, TimeWindow};

/// Keep only rows whose signal is in the set; pass through when no set is
/// given.
pub fn filter_by_signal(rows: Vec<RawReading>, signals: Option<&SignalSet>) -> Vec<RawReading> {
    let Some(signals) = signals else {
        return rows;
    };
    let kept: Vec<RawReading> = rows
        .into_iter()
        .filter(|row| signals.contains(&row.signal_id))
        .collect();
    debug!("selected {} readings by signal", kept.len());
    kept
}

/// Keep rows whose timestamp falls inside at least one window, inclusive at
/// both ends. Returns each surviving row paired with its parsed timestamp.
///
/// Every remaining timestamp is parsed first; one malformed cell fails the
/// whole file load. A row inside several overlapping windows is retained
/// once: filtering is table-level, not per-event.
pub fn filter_by_window(
    rows: Vec<RawReading>,
    windows: &[TimeWindow],
) -> Result<Vec<(NaiveDateTime, RawReading)>> {
    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        let timestamp = NaiveDateTime::parse_from_str(&row.timestamp, READING_TIMESTAMP_FORMAT)
            .map_err(|_| AssemblyError::Timestamp {
                value: row.timestamp.clone(),
                format: READING_TIMESTAMP_FORMAT,
            })?;
        parsed.push((timestamp, row));
    }

    let intervals = merge_intervals(windows);
    let kept: Vec<(NaiveDateTime, RawReading)> = parsed
        .into_iter()
        .filter(|(timestamp, _)| covered(*timestamp, &intervals))
        .collect();
    debug!("selected {} readings by timestamp", kept.len());
    Ok(kept)
}

/// Membership in a sorted, disjoint interval set.
fn covered(timestamp: NaiveDateTime, intervals: &[(NaiveDateTime, NaiveDateTime)]) -> bool {
    let idx = intervals.partition_point(|(start, _)| *start <= timestamp);
    idx > 0 && timestamp <= intervals[idx - 1].1
}
