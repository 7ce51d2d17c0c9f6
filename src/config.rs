//! Load configuration management.
//!
//! A [`LoadConfig`] fully describes one dataset assembly: where the
//! entity-partitioned log files live, the optional signal restriction, the
//! lookback behind each cutoff, and whether to split the label column out
//! of the target table. Configurations serialize to TOML or JSON so an
//! assembly is reproducible from a checked-in file.
//!
//! # Example
//!
//! ```ignore
//! use dataset_assembler::{DatasetAssembler, LoadConfig};
//!
//! let mut config = LoadConfig::new("data/readings");
//! config.lookback = Some("30d".to_string());
//! config.save_toml("configs/assembly.toml")?;
//!
//! let loaded = LoadConfig::load_toml("configs/assembly.toml")?;
//! let assembler = DatasetAssembler::from_config(loaded)?;
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;

use crate::signals::SignalSource;
use crate::window::parse_lookback;

/// Configuration for one dataset assembly.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoadConfig {
    /// Root directory holding one sub-directory per entity, named exactly
    /// by the entity id.
    pub readings_dir: PathBuf,

    /// Name of the label column in the target table.
    #[serde(default = "default_target_column")]
    pub target_column: String,

    /// How far back before each cutoff to load, e.g. `"30d"`. Absent means
    /// all history up to the cutoff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookback: Option<String>,

    /// Whether to split the label column into a separate vector.
    #[serde(default = "default_return_target")]
    pub return_target: bool,

    /// Optional restriction of which signals to load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<SignalSource>,

    /// Free-form provenance block (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DatasetMetadata>,
}

fn default_target_column() -> String {
    "target".to_string()
}

fn default_return_target() -> bool {
    true
}

/// Provenance metadata recorded alongside a dataset configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DatasetMetadata {
    /// Dataset or experiment name.
    pub name: String,

    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp, free-form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Version tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Arbitrary tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            readings_dir: PathBuf::new(),
            target_column: default_target_column(),
            lookback: None,
            return_target: true,
            signals: None,
            metadata: None,
        }
    }
}

impl LoadConfig {
    /// Create a configuration rooted at the given readings directory.
    pub fn new(readings_dir: impl Into<PathBuf>) -> Self {
        Self {
            readings_dir: readings_dir.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration.
    ///
    /// Returns Ok(()) if valid, Err(msg) otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.readings_dir.as_os_str().is_empty() {
            return Err("readings_dir must not be empty".to_string());
        }
        if self.target_column.is_empty() {
            return Err("target_column must not be empty".to_string());
        }
        if let Some(expr) = &self.lookback {
            parse_lookback(expr).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Parsed lookback duration, if one is configured.
    pub fn lookback_duration(&self) -> crate::error::Result<Option<Duration>> {
        self.lookback.as_deref().map(parse_lookback).transpose()
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: LoadConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: LoadConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
