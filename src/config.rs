//! Configuration System
//!
//! Layered configuration for the grid, root slot defaults, document storage
//! and logging. Sources are merged by [`ConfigLoader`] with environment
//! variable overrides on top, then checked with [`StrataConfig::validate`].

use crate::error::ApiError;
use crate::layout::GridConstraints;
use crate::logging::LoggingConfig;
use crate::slot::RootDefaults;
use crate::types::{DataProviderRef, EditorRef, SlotValue, TimeRange};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrataConfig {
    #[serde(default)]
    pub grid: GridConfig,

    /// Values used when no node up to the root defines a slot
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Grid dimensions, in cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_columns")]
    pub columns: u32,
    #[serde(default = "default_width")]
    pub default_width: u32,
    #[serde(default = "default_height")]
    pub default_height: u32,
    #[serde(default = "default_min")]
    pub min_width: u32,
    #[serde(default = "default_min")]
    pub min_height: u32,
}

fn default_columns() -> u32 {
    24
}

fn default_width() -> u32 {
    12
}

fn default_height() -> u32 {
    8
}

fn default_min() -> u32 {
    1
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            default_width: default_width(),
            default_height: default_height(),
            min_width: default_min(),
            min_height: default_min(),
        }
    }
}

impl GridConfig {
    pub fn constraints(&self) -> GridConstraints {
        GridConstraints {
            columns: self.columns,
            default_width: self.default_width,
            default_height: self.default_height,
            min_width: self.min_width,
            min_height: self.min_height,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.columns == 0 {
            return Err("columns must be at least 1".to_string());
        }
        if self.default_width > self.columns {
            return Err(format!(
                "default_width {} exceeds {} columns",
                self.default_width, self.columns
            ));
        }
        if self.min_width == 0 || self.min_height == 0 {
            return Err("minimum sizes must be at least 1".to_string());
        }
        if self.min_width > self.default_width || self.min_height > self.default_height {
            return Err(format!(
                "minimum size {}x{} exceeds default size {}x{}",
                self.min_width, self.min_height, self.default_width, self.default_height
            ));
        }
        Ok(())
    }
}

/// Root defaults per slot kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_time_range", skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_provider: Option<DataProviderRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<EditorRef>,
}

fn default_time_range() -> Option<TimeRange> {
    Some(TimeRange::last("6h"))
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            time_range: default_time_range(),
            data_provider: None,
            editor: None,
        }
    }
}

impl DefaultsConfig {
    pub fn root_defaults(&self) -> RootDefaults {
        let mut defaults = RootDefaults::new();
        if let Some(range) = &self.time_range {
            defaults.set(SlotValue::TimeRange(range.clone()));
        }
        if let Some(provider) = &self.data_provider {
            defaults.set(SlotValue::DataProvider(provider.clone()));
        }
        if let Some(editor) = &self.editor {
            defaults.set(SlotValue::Editor(editor.clone()));
        }
        defaults
    }

    fn values(&self) -> Vec<SlotValue> {
        let mut values = Vec::new();
        values.extend(self.time_range.clone().map(SlotValue::TimeRange));
        values.extend(self.data_provider.clone().map(SlotValue::DataProvider));
        values.extend(self.editor.clone().map(SlotValue::Editor));
        values
    }
}

/// Where named scene documents are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

pub(crate) fn default_store_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "strata")
        .map(|dirs| dirs.data_dir().join("store"))
        .unwrap_or_else(|| PathBuf::from(".strata/store"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Grid(String),
    Defaults(String, String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Grid(msg) => write!(f, "Grid: {}", msg),
            ValidationError::Defaults(kind, msg) => write!(f, "Default {}: {}", kind, msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl StrataConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.grid.validate() {
            errors.push(ValidationError::Grid(e));
        }
        for value in self.defaults.values() {
            if let Err(e) = value.validate() {
                errors.push(ValidationError::Defaults(value.kind().to_string(), e));
            }
        }
        if self.storage.store_path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "store path cannot be empty".to_string(),
            ));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold all errors into one `ApiError::ConfigError`.
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;
        Ok(self)
    }

    pub fn to_toml_string(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self)
            .map_err(|e| ApiError::ConfigError(format!("Failed to encode config: {}", e)))
    }
}
