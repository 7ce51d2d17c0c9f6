//! File selection: decide which log files to open without opening them.
//!
//! Log files encode a coarse date range in their name (a leading `YYYY-MM`
//! token). Selection is a file-granularity overlap test against the hull of
//! an entity's windows: it may select files that turn out to hold zero
//! matching rows, but it must never skip a file holding a relevant row.
//!
//! The encoding convention is injectable: implement [`FileRangePredicate`]
//! to support a different naming scheme without touching the assembly
//! logic.
//!
//! # Example
//!
//! ```ignore
//! let names = vec!["2020-01.csv".to_string(), "2020-06.csv".to_string()];
//! let selected: Vec<&str> = select_files(&names, &windows, &MonthTokenPredicate).collect();
//! ```

use chrono::{Datelike, NaiveDateTime};

use crate::window::TimeWindow;

/// Hull over one entity's windows: the earliest start and latest end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpan {
    pub earliest_start: NaiveDateTime,
    pub latest_end: NaiveDateTime,
}

impl WindowSpan {
    /// Compute the hull, or `None` for an empty window set.
    pub fn of(windows: &[TimeWindow]) -> Option<Self> {
        let first = windows.first()?;
        let mut span = WindowSpan {
            earliest_start: first.start,
            latest_end: first.end,
        };
        for window in &windows[1..] {
            span.earliest_start = span.earliest_start.min(window.start);
            span.latest_end = span.latest_end.max(window.end);
        }
        Some(span)
    }
}

/// Coarse overlap test between a file name and a window span.
///
/// Implementations must be conservative: when in doubt, report `true`.
/// False positives cost one wasted file load; a false negative silently
/// drops relevant rows from the dataset.
pub trait FileRangePredicate: Send + Sync {
    fn may_contain(&self, file_name: &str, span: &WindowSpan) -> bool;
}

/// Default predicate for names carrying a leading `YYYY-MM` token.
///
/// A file is kept iff its month token lies within the span's start and end
/// months, inclusive. Names without a parseable token are always kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthTokenPredicate;

impl MonthTokenPredicate {
    fn month_token(file_name: &str) -> Option<(i32, u32)> {
        let bytes = file_name.as_bytes();
        if bytes.len() < 7 || bytes[4] != b'-' {
            return None;
        }
        if !bytes[..4].iter().all(u8::is_ascii_digit)
            || !bytes[5..7].iter().all(u8::is_ascii_digit)
        {
            return None;
        }
        let year = file_name[..4].parse().ok()?;
        let month = file_name[5..7].parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some((year, month))
    }
}

impl FileRangePredicate for MonthTokenPredicate {
    fn may_contain(&self, file_name: &str, span: &WindowSpan) -> bool {
        match Self::month_token(file_name) {
            // Unknown encoding: keep the file.
            None => true,
            Some(token) => {
                let lo = (span.earliest_start.year(), span.earliest_start.month());
                let hi = (span.latest_end.year(), span.latest_end.month());
                lo <= token && token <= hi
            }
        }
    }
}

/// Lazily filter an entity's sorted file names down to the ones worth
/// opening. Calling again restarts the selection.
///
/// An empty window set selects nothing.
pub fn select_files<'a>(
    file_names: &'a [String],
    windows: &[TimeWindow],
    predicate: &'a dyn FileRangePredicate,
) -> impl Iterator<Item = &'a str> + 'a {
    let span = WindowSpan::of(windows);
    file_names
        .iter()
        .map(String::as_str)
        .filter(move |name| match span {
            Some(span) => predicate.may_contain(name, &span),
            None => false,
        })
}
