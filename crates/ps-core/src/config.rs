//! Engine configuration loading and validation.
//!
//! Hosting applications can ship summary defaults as a TOML file:
//!
//! ```toml
//! schema_version = "1.0.0"
//!
//! [summary]
//! include_partitions = true
//! tolerance = 1e-9
//! precision = 4
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::summary::SummaryOptions;

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Engine configuration: summary defaults for a hosting application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub schema_version: String,

    #[serde(default)]
    pub summary: SummaryOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            summary: SummaryOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML configuration string.
    pub fn from_toml_str(input: &str) -> ValidationResult<Self> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| ValidationError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn from_file(path: &std::path::Path) -> ValidationResult<Self> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::IoError(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&input)
    }

    /// Validate the configuration semantically.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.schema_version != CONFIG_SCHEMA_VERSION {
            return Err(ValidationError::VersionMismatch {
                expected: CONFIG_SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }
        if !self.summary.tolerance.is_finite() || self.summary.tolerance < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "summary.tolerance".to_string(),
                message: format!(
                    "must be a finite non-negative number, got {}",
                    self.summary.tolerance
                ),
            });
        }
        if let Some(precision) = self.summary.precision {
            if precision > 17 {
                return Err(ValidationError::InvalidValue {
                    field: "summary.precision".to_string(),
                    message: format!("must be at most 17 digits, got {precision}"),
                });
            }
        }
        Ok(())
    }
}
