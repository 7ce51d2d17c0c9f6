//! Central error type for dataset assembly.
//!
//! Every fallible operation in the crate routes through [`AssemblyError`].
//! A load call either returns the full assembled dataset or one of these
//! errors; there is no partial-success result and no skip-and-continue.

use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AssemblyError>;

/// Errors raised during dataset assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Two target events share the same (entity, cutoff) pair.
    #[error("duplicate target event for entity `{entity_id}` at cutoff {cutoff_time}")]
    DuplicateTarget {
        entity_id: String,
        cutoff_time: NaiveDateTime,
    },

    /// A label split was requested but a target row carries no label.
    #[error("missing `{column}` label for entity `{entity_id}` at cutoff {cutoff_time}")]
    MissingTarget {
        column: String,
        entity_id: String,
        cutoff_time: NaiveDateTime,
    },

    /// A required column is absent from a delimited file.
    #[error("missing required column `{}` in `{}`", .column, .path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// A timestamp cell did not match the expected textual format.
    #[error("invalid timestamp `{value}`: expected format `{format}`")]
    Timestamp {
        value: String,
        format: &'static str,
    },

    /// A value cell could not be coerced to a number.
    #[error("invalid numeric value `{}` in `{}`", .value, .path.display())]
    Value { path: PathBuf, value: String },

    /// A lookback expression could not be parsed.
    #[error("invalid lookback expression `{0}`: expected `<number><unit>` such as `30d`")]
    Lookback(String),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Filesystem failure, with the offending path attached.
    #[error("i/o error at `{}`: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// CSV-level failure, with the offending path attached.
    #[error("csv error in `{}`: {}", .path.display(), .source)]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl AssemblyError {
    /// Attach a path to a raw I/O error.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AssemblyError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach a path to a CSV error.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        AssemblyError::Csv {
            path: path.into(),
            source,
        }
    }

    /// Missing-column error for a delimited file.
    pub fn missing_column(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        AssemblyError::MissingColumn {
            path: path.into(),
            column: column.into(),
        }
    }
}

impl From<String> for AssemblyError {
    fn from(message: String) -> Self {
        AssemblyError::Config(message)
    }
}
