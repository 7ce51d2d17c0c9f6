//! Single-file log ingestion.
//!
//! Reads one raw log file into memory and normalizes it to the canonical
//! reading schema: `timestamp`, `signal_id`, `value`. Header names are
//! matched case-insensitively, the raw `signal` column is renamed to
//! `signal_id`, and a leftover serialized index column is dropped silently.
//! Timestamps stay textual here; they are parsed downstream, after the
//! signal filter has had a chance to drop rows.
//!
//! A missing or unreadable file, a missing required column, or a
//! non-numeric value cell aborts the whole load call.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use log::{debug, info};

use crate::error::{AssemblyError, Result};

/// Fixed textual format of reading timestamps in raw log files.
pub const READING_TIMESTAMP_FORMAT: &str = "%m/%d/%y %H:%M:%S";

/// One row of one log file. The entity tag is not attached yet; the file's
/// containing partition carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    /// Reading instant, still in the raw textual format.
    pub timestamp: String,

    /// Signal identifier (canonical name for the raw `signal` column).
    pub signal_id: String,

    /// Measured value.
    pub value: f64,
}

/// Load one raw log file into canonical reading rows.
pub fn read_log_file(path: &Path) -> Result<Vec<RawReading>> {
    info!("loading file {}", path.display());

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| AssemblyError::csv(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| AssemblyError::csv(path, e))?
        .clone();

    let mut timestamp_idx = None;
    let mut signal_idx = None;
    let mut value_idx = None;
    for (idx, name) in headers.iter().enumerate() {
        match name.to_ascii_lowercase().as_str() {
            "timestamp" => timestamp_idx = Some(idx),
            "signal" | "signal_id" => signal_idx = Some(idx),
            "value" => value_idx = Some(idx),
            // Leftover row index from an upstream export that forgot to
            // drop it before serializing.
            "unnamed: 0" => debug!("dropping index column in {}", path.display()),
            other => debug!("ignoring column `{other}` in {}", path.display()),
        }
    }
    let timestamp_idx =
        timestamp_idx.ok_or_else(|| AssemblyError::missing_column(path, "timestamp"))?;
    let signal_idx = signal_idx.ok_or_else(|| AssemblyError::missing_column(path, "signal"))?;
    let value_idx = value_idx.ok_or_else(|| AssemblyError::missing_column(path, "value"))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AssemblyError::csv(path, e))?;
        let raw_value = record.get(value_idx).unwrap_or("");
        let value = raw_value.parse::<f64>().map_err(|_| AssemblyError::Value {
            path: path.to_path_buf(),
            value: raw_value.to_string(),
        })?;
        rows.push(RawReading {
            timestamp: record.get(timestamp_idx).unwrap_or("").to_string(),
            signal_id: record.get(signal_idx).unwrap_or("").to_string(),
            value,
        });
    }

    info!("loaded {} readings from {}", rows.len(), path.display());
    Ok(rows)
}
