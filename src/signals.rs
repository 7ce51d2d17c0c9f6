//! Signal sets: optional restriction of which measurements are loaded.
//!
//! A signal set arrives as an explicit identifier list or as a delimited
//! file with a `signal_id` column; either way it normalizes into a hash set
//! used for membership tests. Absence of a signal set means "all signals".

use std::path::{Path, PathBuf};

use ahash::AHashSet;
use csv::{ReaderBuilder, Trim};
use log::info;

use crate::error::{AssemblyError, Result};

/// Where a signal restriction comes from.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum SignalSource {
    /// Explicit list of signal identifiers.
    List(Vec<String>),
    /// Delimited file with a `signal_id` column.
    Csv(PathBuf),
}

impl From<Vec<String>> for SignalSource {
    fn from(ids: Vec<String>) -> Self {
        SignalSource::List(ids)
    }
}

impl From<&[&str]> for SignalSource {
    fn from(ids: &[&str]) -> Self {
        SignalSource::List(ids.iter().map(|s| s.to_string()).collect())
    }
}

impl From<PathBuf> for SignalSource {
    fn from(path: PathBuf) -> Self {
        SignalSource::Csv(path)
    }
}

impl From<&Path> for SignalSource {
    fn from(path: &Path) -> Self {
        SignalSource::Csv(path.to_path_buf())
    }
}

impl SignalSource {
    /// Normalize into a membership set, reading the file if needed.
    pub fn resolve(&self) -> Result<SignalSet> {
        match self {
            SignalSource::List(ids) => Ok(SignalSet::new(ids.iter().cloned())),
            SignalSource::Csv(path) => read_signal_set(path),
        }
    }
}

/// Set of signal identifiers a load is restricted to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSet {
    ids: AHashSet<String>,
}

impl SignalSet {
    pub fn new(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, signal_id: &str) -> bool {
        self.ids.contains(signal_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn read_signal_set(path: &Path) -> Result<SignalSet> {
    info!("loading signal set from {}", path.display());

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| AssemblyError::csv(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| AssemblyError::csv(path, e))?
        .clone();

    let signal_idx = headers
        .iter()
        .position(|name| name.eq_ignore_ascii_case("signal_id"))
        .ok_or_else(|| AssemblyError::missing_column(path, "signal_id"))?;

    let mut ids = AHashSet::new();
    for record in reader.records() {
        let record = record.map_err(|e| AssemblyError::csv(path, e))?;
        if let Some(id) = record.get(signal_idx) {
            if !id.is_empty() {
                ids.insert(id.to_string());
            }
        }
    }
    Ok(SignalSet { ids })
}
