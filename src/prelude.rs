//! Prelude module for convenient imports.
//!
//! Re-exports the most commonly used types for ergonomic usage of the
//! assembly library.
//!
//! # Usage
//!
//! ```ignore
//! use dataset_assembler::prelude::*;
//!
//! let assembler = DatasetAssembler::builder()
//!     .readings_dir("data/readings")
//!     .lookback("30d")
//!     .build()?;
//! let dataset = assembler.load("data/target_times.csv")?;
//! ```

// ============================================================================
// Core Assembly
// ============================================================================

pub use crate::assemble::{AssembledDataset, DatasetAssembler, Reading};
pub use crate::builder::DatasetAssemblerBuilder;
pub use crate::config::{DatasetMetadata, LoadConfig};

// ============================================================================
// Inputs
// ============================================================================

pub use crate::signals::{SignalSet, SignalSource};
pub use crate::target::{TargetEvent, TargetSource};

// ============================================================================
// Windows & File Selection
// ============================================================================

pub use crate::select::{FileRangePredicate, MonthTokenPredicate, WindowSpan};
pub use crate::window::TimeWindow;

// ============================================================================
// Error Handling
// ============================================================================

pub use crate::error::{AssemblyError, Result};
