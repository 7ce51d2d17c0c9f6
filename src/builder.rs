//! Fluent builder for the dataset assembler.
//!
//! The builder keeps the common case short and the unusual case possible:
//! a readings directory is the only required piece, everything else has a
//! default, and a custom file-range predicate can be injected for log
//! naming schemes other than the monthly `YYYY-MM` token.
//!
//! # Quick Start
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
//! ```

use std::path::PathBuf;

use crate::assemble::DatasetAssembler;
use crate::config::{DatasetMetadata, LoadConfig};
use crate::error::Result;
use crate::select::{FileRangePredicate, MonthTokenPredicate};
use crate::signals::SignalSource;

/// Builder for [`DatasetAssembler`].
///
/// Defaults: label column `target`, label split enabled, no signal
/// restriction, no lookback (all history up to each cutoff), monthly
/// file-name tokens, serial entity assembly.
pub struct DatasetAssemblerBuilder {
    config: LoadConfig,
    predicate: Option<Box<dyn FileRangePredicate>>,
    parallel: bool,
}

impl Default for DatasetAssemblerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetAssemblerBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: LoadConfig::default(),
            predicate: None,
            parallel: false,
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: LoadConfig) -> Self {
        Self {
            config,
            predicate: None,
            parallel: false,
        }
    }

    /// Root directory holding one sub-directory per entity.
    pub fn readings_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.readings_dir = dir.into();
        self
    }

    /// Lookback expression, e.g. `"30d"`.
    pub fn lookback(mut self, expr: impl Into<String>) -> Self {
        self.config.lookback = Some(expr.into());
        self
    }

    /// Restrict loading to an explicit list of signals.
    pub fn signals<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.signals = Some(SignalSource::List(
            ids.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Restrict loading to the signals listed in a file's `signal_id`
    /// column.
    pub fn signals_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.signals = Some(SignalSource::Csv(path.into()));
        self
    }

    /// Name of the label column in the target table.
    pub fn target_column(mut self, name: impl Into<String>) -> Self {
        self.config.target_column = name.into();
        self
    }

    /// Leave the label column embedded in the target table instead of
    /// splitting it into a separate vector.
    pub fn keep_target(mut self) -> Self {
        self.config.return_target = false;
        self
    }

    /// Attach provenance metadata.
    pub fn metadata(mut self, metadata: DatasetMetadata) -> Self {
        self.config.metadata = Some(metadata);
        self
    }

    /// Inject a file-range predicate for a non-monthly naming scheme.
    pub fn range_predicate<P: FileRangePredicate + 'static>(mut self, predicate: P) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Fan entity assembly out across threads (needs the `parallel`
    /// feature; output is identical to the serial path).
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Validate the configuration and build the assembler.
    pub fn build(self) -> Result<DatasetAssembler> {
        self.config.validate()?;
        let predicate = self
            .predicate
            .unwrap_or_else(|| Box::new(MonthTokenPredicate));
        Ok(DatasetAssembler::from_parts(
            self.config,
            predicate,
            self.parallel,
        ))
    }
}
