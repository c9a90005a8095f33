//! `bitsieve` configuration.
//!
//! Provides configuration file support via `bitsieve.toml` and environment
//! variables.
//!
//! # Priority (highest to lowest)
//!
//! 1. Environment variables (`BITSIEVE_*`, `__` separates section and key,
//!    e.g. `BITSIEVE_FILTER__CHUNK_ROWS`)
//! 2. Configuration file (`bitsieve.toml`)
//! 3. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::backend::BackendKind;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// Backend requested by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendChoice {
    /// Let the capability selector decide (default).
    #[default]
    Auto,
    /// Force the scalar reference strategy.
    Scalar,
    /// Force the portable `wide` strategy.
    Wide,
    /// Force the AVX2 strategy.
    Avx2,
    /// Force the NEON strategy.
    Neon,
}

impl BackendChoice {
    /// The forced strategy, or `None` for `auto`.
    #[must_use]
    pub const fn forced(self) -> Option<BackendKind> {
        match self {
            Self::Auto => None,
            Self::Scalar => Some(BackendKind::Scalar),
            Self::Wide => Some(BackendKind::Wide),
            Self::Avx2 => Some(BackendKind::Avx2),
            Self::Neon => Some(BackendKind::Neon),
        }
    }
}

impl From<BackendKind> for BackendChoice {
    fn from(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Scalar => Self::Scalar,
            BackendKind::Wide => Self::Wide,
            BackendKind::Avx2 => Self::Avx2,
            BackendKind::Neon => Self::Neon,
        }
    }
}

/// Dispatch configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Strategy to bind: auto, scalar, wide, avx2, neon.
    pub backend: BackendChoice,
}

/// Column filter configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Retry on the scalar strategy when the active one reports no coverage.
    pub fallback_to_scalar: bool,
    /// Row count from which `evaluate_parallel` splits work across threads.
    pub parallel_threshold_rows: usize,
    /// Rows per parallel chunk (positive multiple of 8).
    pub chunk_rows: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            fallback_to_scalar: true,
            parallel_threshold_rows: 65_536,
            chunk_rows: 16_384,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Log format: text or json.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Main `bitsieve` configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SieveConfig {
    /// Dispatch configuration.
    pub dispatch: DispatchConfig,
    /// Column filter configuration.
    pub filter: FilterConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl SieveConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("bitsieve.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("BITSIEVE_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chunk_rows = self.filter.chunk_rows;
        if chunk_rows == 0 || chunk_rows % 8 != 0 {
            return Err(ConfigError::InvalidValue {
                key: "filter.chunk_rows".to_string(),
                message: format!("value {chunk_rows} must be a positive multiple of 8"),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
