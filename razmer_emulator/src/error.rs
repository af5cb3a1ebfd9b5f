//! Emulator error type.
//!
//! Only construction can fail. Once an [`EmulatorCore`](crate::core::EmulatorCore)
//! exists every operation is total.

use razmer_common::config::ConfigError;
use razmer_common::format::LayoutError;
use thiserror::Error;

/// Errors raised while building the emulator.
#[derive(Debug, Clone, Error)]
pub enum EmulatorError {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Axis layout parameters are out of range.
    #[error("Invalid axis layout: {0}")]
    Layout(#[from] LayoutError),
}
