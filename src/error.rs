//! Error types for tempmon

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tempmon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers.
///
/// Sensor reads never produce these: a missing or garbled sysfs file degrades
/// to an inactive sensor or a fallback value instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Discovery finished without a single temperature channel
    #[error(
        "No temperature sensors detected under {} or {}",
        hwmon_root.display(),
        thermal_root.display()
    )]
    NoSensors {
        hwmon_root: PathBuf,
        thermal_root: PathBuf,
    },

    /// Terminal setup or drawing failed
    #[error("Terminal error: {0}")]
    Terminal(String),
}
