//! Error types for the input driver and its configuration

use crate::driver::mode::DriverMode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the input driver.
///
/// Most variants are contract violations: the caller asked for something the
/// driver never allows (an illegal mode switch, sensed input outside of
/// sensing, a player index past the supported range). They are reported
/// instead of recovered.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Requested mode switch is not part of the transition table
    #[error("Illegal mode transition: {from} -> {to}")]
    IllegalTransition { from: DriverMode, to: DriverMode },

    /// Sensed input was requested while not in input sense mode
    #[error("Sensed input requested in {0} mode")]
    NotSensing(DriverMode),

    /// Input sense mode is active but nothing has been recorded yet
    #[error("No input has been sensed yet")]
    NothingSensed,

    /// Player index outside of the supported range
    #[error("Player index {index} out of range (limit {limit})")]
    PlayerOutOfRange { index: usize, limit: usize },

    /// Failure in the platform backend
    #[error("Platform error: {0}")]
    Platform(String),

    /// Invalid or unreadable configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading, saving or validating the input configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
