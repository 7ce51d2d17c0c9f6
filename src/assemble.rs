//! Dataset assembly: the orchestration that turns target events plus raw
//! log partitions into one coherent readings table.
//!
//! # Architecture
//!
//! ```text
//! target events ──► duplicate check ──► time windows
//!                                          │ (partitioned by entity,
//!                                          ▼  entities in sorted order)
//!                        ┌──────────── entity assembly ────────────┐
//!                        │ list partition → select files           │
//!                        │ per file: ingest → signal filter        │
//!                        │           → window filter → entity tag  │
//!                        └──────────────────┬──────────────────────┘
//!                                           ▼
//!                        global concat ──► optional label split
//! ```
//!
//! Entities are processed strictly in lexicographic order; consumers may
//! rely on that ordering. Each entity works on its own slice of windows
//! with no shared mutable state, so the optional `parallel` feature fans
//! entities out across threads and re-imposes the same order on
//! collection; the output is identical either way.
//!
//! Any failure (duplicate targets, missing partition directory, unreadable
//! file, malformed timestamp or value) aborts the whole load; there is no
//! per-entity or per-file skip-and-continue. The assembled dataset is
//! either complete and temporally consistent, or absent.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::info;

use crate::builder::DatasetAssemblerBuilder;
use crate::config::LoadConfig;
use crate::error::{AssemblyError, Result};
use crate::filter::{filter_by_signal, filter_by_window};
use crate::ingest::read_log_file;
use crate::select::{select_files, FileRangePredicate, MonthTokenPredicate};
use crate::signals::SignalSet;
use crate::target::{check_unique, split_target, TargetEvent, TargetSource};
use crate::window::{resolve_windows, TimeWindow};

/// One reading of the assembled dataset. Immutable once produced.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Reading {
    /// Entity this reading belongs to (from its containing partition).
    pub entity_id: String,

    /// Signal identifier.
    pub signal_id: String,

    /// Instant the reading was taken.
    pub timestamp: NaiveDateTime,

    /// Measured value.
    pub value: f64,
}

/// Output of one load call: the full tuple or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledDataset {
    /// Target table, label-free when the label was split out.
    pub target_times: Vec<TargetEvent>,

    /// Label vector aligned 1:1 with `target_times`, when split.
    pub target: Option<Vec<f64>>,

    /// All readings relevant to the targets, grouped by entity in
    /// lexicographic order.
    pub readings: Vec<Reading>,
}

/// Assembles ML-ready datasets from entity-partitioned raw log files.
///
/// # Example
///
/// ```ignore
/// use dataset_assembler::DatasetAssembler;
///
/// let assembler = DatasetAssembler::builder()
///     .readings_dir("data/readings")
///     .lookback("30d")
///     .signals(["S1", "S2"])
///     .build()?;
///
/// let dataset = assembler.load("data/target_times.csv")?;
/// println!("{} readings", dataset.readings.len());
/// ```
pub struct DatasetAssembler {
    config: LoadConfig,
    predicate: Box<dyn FileRangePredicate>,
    parallel: bool,
}

impl DatasetAssembler {
    /// Create an assembler with default options over a readings directory.
    pub fn new(readings_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: LoadConfig::new(readings_dir),
            predicate: Box::new(MonthTokenPredicate),
            parallel: false,
        }
    }

    /// Create an assembler from a validated configuration.
    pub fn from_config(config: LoadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            predicate: Box::new(MonthTokenPredicate),
            parallel: false,
        })
    }

    /// Start a fluent builder.
    pub fn builder() -> DatasetAssemblerBuilder {
        DatasetAssemblerBuilder::new()
    }

    pub(crate) fn from_parts(
        config: LoadConfig,
        predicate: Box<dyn FileRangePredicate>,
        parallel: bool,
    ) -> Self {
        Self {
            config,
            predicate,
            parallel,
        }
    }

    /// The assembler's configuration.
    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Assemble the dataset for the given target events.
    ///
    /// Stages, in strict order: normalize and validate targets, normalize
    /// the signal set, resolve time windows, assemble readings per entity
    /// (sorted), concatenate, then optionally split the label column.
    pub fn load(&self, targets: impl Into<TargetSource>) -> Result<AssembledDataset> {
        let targets = targets.into().resolve(&self.config.target_column)?;
        check_unique(&targets)?;

        let signals = self
            .config
            .signals
            .as_ref()
            .map(|source| source.resolve())
            .transpose()?;
        let lookback = self.config.lookback_duration()?;
        let windows = resolve_windows(&targets, lookback);

        let readings = self.load_readings(&windows, signals.as_ref())?;
        info!("loaded {} readings in total", readings.len());

        if self.config.return_target {
            let (target_times, labels) = split_target(targets, &self.config.target_column)?;
            Ok(AssembledDataset {
                target_times,
                target: Some(labels),
                readings,
            })
        } else {
            Ok(AssembledDataset {
                target_times: targets,
                target: None,
                readings,
            })
        }
    }

    fn load_readings(
        &self,
        windows: &[TimeWindow],
        signals: Option<&SignalSet>,
    ) -> Result<Vec<Reading>> {
        let groups = partition_by_entity(windows);
        if self.parallel {
            self.load_entities_parallel(&groups, signals)
        } else {
            self.load_entities_serial(&groups, signals)
        }
    }

    fn load_entities_serial(
        &self,
        groups: &[(String, Vec<TimeWindow>)],
        signals: Option<&SignalSet>,
    ) -> Result<Vec<Reading>> {
        let mut readings = Vec::new();
        for (entity_id, windows) in groups {
            readings.extend(self.assemble_entity(entity_id, windows, signals)?);
        }
        Ok(readings)
    }

    #[cfg(feature = "parallel")]
    fn load_entities_parallel(
        &self,
        groups: &[(String, Vec<TimeWindow>)],
        signals: Option<&SignalSet>,
    ) -> Result<Vec<Reading>> {
        use rayon::prelude::*;

        // Entities are independent; collection re-imposes sorted order.
        let per_entity: Result<Vec<Vec<Reading>>> = groups
            .par_iter()
            .map(|(entity_id, windows)| self.assemble_entity(entity_id, windows, signals))
            .collect();
        Ok(per_entity?.into_iter().flatten().collect())
    }

    #[cfg(not(feature = "parallel"))]
    fn load_entities_parallel(
        &self,
        groups: &[(String, Vec<TimeWindow>)],
        signals: Option<&SignalSet>,
    ) -> Result<Vec<Reading>> {
        log::warn!("parallel assembly requested but the `parallel` feature is disabled");
        self.load_entities_serial(groups, signals)
    }

    /// Assemble all relevant readings of one entity.
    ///
    /// Zero selected files or zero surviving rows is a valid, empty result;
    /// a missing partition directory is not.
    fn assemble_entity(
        &self,
        entity_id: &str,
        windows: &[TimeWindow],
        signals: Option<&SignalSet>,
    ) -> Result<Vec<Reading>> {
        info!("loading entity {entity_id} readings");
        let partition = self.config.readings_dir.join(entity_id);
        let file_names = list_partition(&partition)?;

        let mut readings = Vec::new();
        for name in select_files(&file_names, windows, self.predicate.as_ref()) {
            let path = partition.join(name);
            let rows = read_log_file(&path)?;
            let rows = filter_by_signal(rows, signals);
            let kept = filter_by_window(rows, windows)?;
            readings.extend(kept.into_iter().map(|(timestamp, row)| Reading {
                entity_id: entity_id.to_string(),
                signal_id: row.signal_id,
                timestamp,
                value: row.value,
            }));
        }

        info!("loaded {} readings from entity {entity_id}", readings.len());
        Ok(readings)
    }
}

/// Group windows by entity, entities in lexicographic order, windows in
/// input order within each entity.
fn partition_by_entity(windows: &[TimeWindow]) -> Vec<(String, Vec<TimeWindow>)> {
    let mut groups: BTreeMap<String, Vec<TimeWindow>> = BTreeMap::new();
    for window in windows {
        groups
            .entry(window.entity_id.clone())
            .or_default()
            .push(window.clone());
    }
    groups.into_iter().collect()
}

/// Sorted file names of one entity's partition directory.
fn list_partition(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| AssemblyError::io(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AssemblyError::io(dir, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
