//! TOML configuration shared by the engine, the HAL and test harnesses.
//!
//! A component file carries one `[shared]` table (logging and service
//! identity) next to whatever tables the component itself owns.
//!
//! # Usage
//!
//! ```rust,no_run
//! use lhr_common::config::{ConfigLoader, SharedConfig, ConfigError};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct RunnerConfig {
//!     shared: SharedConfig,
//!     deck_slots: u8,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = RunnerConfig::load(Path::new("runner.toml"))?;
//!     config.shared.validate()?;
//!     assert!(config.deck_slots > 0);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::DEFAULT_SERVICE_NAME;

/// Why a configuration file could not be turned into a value.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Nothing at the given path.
    #[error("config file does not exist")]
    FileNotFound,

    /// Unreadable file, bad TOML or a shape mismatch.
    #[error("invalid config: {0}")]
    ParseError(String),

    /// Parsed, but a value is out of range.
    #[error("config rejected: {0}")]
    ValidationError(String),
}

/// Verbosity written as `log_level = "debug"` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    #[inline]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields shared by every LHR component.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "lhr-engine-bench-2"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json_logs: bool,

    /// Name attached to log lines, e.g. `ot2-bench-3`.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            json_logs: false,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl SharedConfig {
    /// Check the fields serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty or
    /// contains whitespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name is empty".to_string(),
            ));
        }
        if self.service_name.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "service_name '{}' must not contain whitespace",
                self.service_name
            )));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files or strings.
///
/// Blanket-implemented for every `serde::de::DeserializeOwned` type.
///
/// # Contract
///
/// - a missing file is `ConfigError::FileNotFound`
/// - any other read failure, TOML syntax or shape error is `ConfigError::ParseError`
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Read and parse `path`.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ConfigError::FileNotFound)
            }
            Err(err) => Err(ConfigError::ParseError(format!("{}: {err}", path.display()))),
        }
    }

    /// Parse configuration from an in-memory TOML document.
    fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
