//! Target events: the prediction cutoffs the dataset is aligned to.
//!
//! A target event ties an entity to a cutoff timestamp, optionally with a
//! label. Targets arrive either as an in-memory table or as a delimited file
//! with `entity_id` and `cutoff_time` columns. A collection of targets must
//! not contain two events sharing the same `(entity_id, cutoff_time)` pair;
//! that invariant is checked up front and a violation aborts the load.

use std::path::{Path, PathBuf};

use ahash::AHashSet;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, Trim};
use log::info;

use crate::error::{AssemblyError, Result};

/// Primary textual format for cutoff timestamps.
pub const CUTOFF_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One prediction target: an entity, the instant its label is deemed known,
/// and optionally the label itself.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TargetEvent {
    /// Identifier of the entity this target belongs to.
    pub entity_id: String,

    /// Only readings at or before this instant may feed the prediction.
    pub cutoff_time: NaiveDateTime,

    /// Label to predict, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

impl TargetEvent {
    /// Create an unlabeled target event.
    pub fn new(entity_id: impl Into<String>, cutoff_time: NaiveDateTime) -> Self {
        Self {
            entity_id: entity_id.into(),
            cutoff_time,
            target: None,
        }
    }

    /// Attach a label.
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }
}

/// Where target events come from.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSource {
    /// An already-typed in-memory table.
    Table(Vec<TargetEvent>),
    /// A delimited file with `entity_id`, `cutoff_time` and optionally a
    /// label column.
    Csv(PathBuf),
}

impl From<Vec<TargetEvent>> for TargetSource {
    fn from(events: Vec<TargetEvent>) -> Self {
        TargetSource::Table(events)
    }
}

impl From<PathBuf> for TargetSource {
    fn from(path: PathBuf) -> Self {
        TargetSource::Csv(path)
    }
}

impl From<&Path> for TargetSource {
    fn from(path: &Path) -> Self {
        TargetSource::Csv(path.to_path_buf())
    }
}

impl From<&str> for TargetSource {
    fn from(path: &str) -> Self {
        TargetSource::Csv(PathBuf::from(path))
    }
}

impl TargetSource {
    /// Normalize the source into a typed table.
    ///
    /// `target_column` names the label column looked up when the source is a
    /// file; an in-memory table is passed through unchanged.
    pub fn resolve(self, target_column: &str) -> Result<Vec<TargetEvent>> {
        match self {
            TargetSource::Table(events) => Ok(events),
            TargetSource::Csv(path) => read_target_times(&path, target_column),
        }
    }
}

/// Parse a cutoff timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, the `T`-separated variant, and a bare date
/// (interpreted as midnight).
pub fn parse_cutoff(value: &str) -> Result<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, CUTOFF_TIMESTAMP_FORMAT) {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(NaiveDateTime::new(date, NaiveTime::MIN));
    }
    Err(AssemblyError::Timestamp {
        value: value.to_string(),
        format: CUTOFF_TIMESTAMP_FORMAT,
    })
}

/// Read a target-times file into a typed table.
///
/// Headers are matched case-insensitively. The label column is optional;
/// rows without it (or with an empty cell) carry `target: None`.
pub fn read_target_times(path: &Path, target_column: &str) -> Result<Vec<TargetEvent>> {
    info!("loading target times from {}", path.display());

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| AssemblyError::csv(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| AssemblyError::csv(path, e))?
        .clone();

    let wanted_target = target_column.to_ascii_lowercase();
    let mut entity_idx = None;
    let mut cutoff_idx = None;
    let mut target_idx = None;
    for (idx, name) in headers.iter().enumerate() {
        let name = name.to_ascii_lowercase();
        if name == "entity_id" {
            entity_idx = Some(idx);
        } else if name == "cutoff_time" {
            cutoff_idx = Some(idx);
        } else if name == wanted_target {
            target_idx = Some(idx);
        }
    }
    let entity_idx = entity_idx.ok_or_else(|| AssemblyError::missing_column(path, "entity_id"))?;
    let cutoff_idx = cutoff_idx.ok_or_else(|| AssemblyError::missing_column(path, "cutoff_time"))?;

    let mut events = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AssemblyError::csv(path, e))?;
        let entity_id = record.get(entity_idx).unwrap_or("").to_string();
        let cutoff_time = parse_cutoff(record.get(cutoff_idx).unwrap_or(""))?;
        let target = match target_idx.and_then(|idx| record.get(idx)) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| AssemblyError::Value {
                path: path.to_path_buf(),
                value: raw.to_string(),
            })?),
        };
        events.push(TargetEvent {
            entity_id,
            cutoff_time,
            target,
        });
    }

    info!("loaded {} target events", events.len());
    Ok(events)
}

/// Reject a target table containing duplicate `(entity_id, cutoff_time)`
/// pairs. Deterministic regardless of row order.
pub fn check_unique(events: &[TargetEvent]) -> Result<()> {
    let mut seen = AHashSet::with_capacity(events.len());
    for event in events {
        if !seen.insert((event.entity_id.as_str(), event.cutoff_time)) {
            return Err(AssemblyError::DuplicateTarget {
                entity_id: event.entity_id.clone(),
                cutoff_time: event.cutoff_time,
            });
        }
    }
    Ok(())
}

/// Split the label column out of a target table.
///
/// Returns the label-free feature rows and the label vector, in row order.
/// A row without a label is fatal: the label split promises a complete
/// vector aligned 1:1 with the feature rows.
pub fn split_target(
    events: Vec<TargetEvent>,
    target_column: &str,
) -> Result<(Vec<TargetEvent>, Vec<f64>)> {
    let mut features = Vec::with_capacity(events.len());
    let mut labels = Vec::with_capacity(events.len());
    for mut event in events {
        match event.target.take() {
            Some(label) => labels.push(label),
            None => {
                return Err(AssemblyError::MissingTarget {
                    column: target_column.to_string(),
                    entity_id: event.entity_id,
                    cutoff_time: event.cutoff_time,
                })
            }
        }
        features.push(event);
    }
    Ok((features, labels))
}
