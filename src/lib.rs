//! Dataset Assembler
//!
//! Assembles machine-learning-ready datasets from distributed, per-entity
//! time-series logs, aligned to a set of prediction cutoff events.
//!
//! # Overview
//!
//! Raw logs live in one directory per entity, named by the entity id, with
//! files whose names carry a coarse `YYYY-MM` date token. Given a table of
//! target events (entity + cutoff timestamp, optionally a label), the
//! assembler locates only the relevant files per entity, restricts rows to
//! the requested signals, trims them to the lookback window ending at each
//! cutoff, and merges everything into one readings table, without loading
//! data that cannot matter.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Dataset Assembler                         │
//! ├────────────────────────────────────────────────────────────────┤
//! │  target.rs   - target events, duplicate check, label split     │
//! │  window.rs   - cutoff → [start, end] windows, lookback         │
//! │  select.rs   - file-name date filter (injectable predicate)    │
//! │  ingest.rs   - one-file CSV load + schema normalization        │
//! │  filter.rs   - signal filter, window filter                    │
//! │  assemble.rs - per-entity orchestration + global concat        │
//! │  config.rs   - TOML/JSON load configuration                    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dataset_assembler::DatasetAssembler;
//!
//! let assembler = DatasetAssembler::builder()
//!     .readings_dir("data/readings")
//!     .lookback("30d")
//!     .signals(["S1", "S2"])
//!     .build()?;
//!
//! let dataset = assembler.load("data/target_times.csv")?;
//! let labels = dataset.target.unwrap();
//! assert_eq!(labels.len(), dataset.target_times.len());
//! ```
//!
//! # Guarantees
//!
//! - Duplicate `(entity, cutoff)` target pairs are rejected up front.
//! - File selection is conservative: a file holding a relevant row is
//!   never skipped; files holding none may still be opened.
//! - Window membership is inclusive at both interval endpoints.
//! - Entities appear in the output in lexicographic order, rows in file
//!   order within each entity; repeated loads over unchanged inputs
//!   produce identical output.
//! - Any failure aborts the whole load; there is no partial dataset.

pub mod assemble;
pub mod builder;
pub mod config;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod prelude;
pub mod select;
pub mod signals;
pub mod target;
pub mod window;

// Re-exports - Assembly
pub use assemble::{AssembledDataset, DatasetAssembler, Reading};
pub use builder::DatasetAssemblerBuilder;

// Re-exports - Configuration
pub use config::{DatasetMetadata, LoadConfig};

// Re-exports - Inputs
pub use signals::{SignalSet, SignalSource};
pub use target::{TargetEvent, TargetSource, CUTOFF_TIMESTAMP_FORMAT};

// Re-exports - Windows & Selection
pub use ingest::{RawReading, READING_TIMESTAMP_FORMAT};
pub use select::{FileRangePredicate, MonthTokenPredicate, WindowSpan};
pub use window::TimeWindow;

// Re-exports - Error handling
pub use error::{AssemblyError, Result};
