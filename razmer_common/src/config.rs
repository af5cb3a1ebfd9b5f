//! TOML configuration loading.
//!
//! Every Razmer2M tool reads one TOML file whose `[shared]` section is a
//! [`SharedConfig`]. Loading goes through the [`ConfigLoader`] blanket
//! trait; semantic checks go through [`Validate`].
//!
//! ```rust,no_run
//! use razmer_common::config::{ConfigError, ConfigLoader};
//! use razmer_common::emulator::EmulatorConfig;
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = EmulatorConfig::load_validated(Path::new("emulator.toml"))?;
//!     println!("strobe: {} us", config.scan.strobe_interval_us);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Service name used when the `[shared]` section is absent.
pub const DEFAULT_SERVICE_NAME: &str = "razmer2m-emulator";

/// Errors raised while loading or checking a configuration file.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// File unreadable or TOML malformed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Parsed fine, but the values are inconsistent.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log verbosity as written in TOML (`"info"`, `"debug"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-strobe detail.
    Trace,
    /// Phase changes and mutations.
    Debug,
    /// Lifecycle events.
    #[default]
    Info,
    /// Timing overruns and dropped frames.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Matching `tracing` level.
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// The `[shared]` section.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "razmer2m-emulator"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Instance name, shows up in the startup log.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

/// Semantic checks run after deserialization.
pub trait Validate {
    /// `Ok` when the values can be used as-is.
    ///
    /// # Errors
    ///
    /// `ConfigError::ValidationError` naming the offending field.
    fn validate(&self) -> Result<(), ConfigError>;
}

impl Validate for SharedConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shared.service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// TOML loading for any deserializable config type.
///
/// - `ConfigError::FileNotFound` if the file does not exist
/// - `ConfigError::ParseError` if it cannot be read or parsed
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Read and parse `path`.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse TOML text.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// [`load`](Self::load) followed by [`Validate::validate`].
    fn load_validated(path: &Path) -> Result<Self, ConfigError>
    where
        Self: Validate,
    {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
