//! Core error types for pillarplan-core.
//!
//! Fallible surfaces here are narrow: configuration I/O, codec work, and
//! the planner service channels. Everything the engine computes degrades
//! instead of failing — empty results (no free slot, no overdue pillar,
//! no matching feedback) are ordinary values, and invalid inputs are
//! normalized at read time rather than rejected.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pillarplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Planner service errors
    #[error("Planner service error: {0}")]
    Service(#[from] ServiceError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Config directory could not be determined or created
    #[error("Failed to resolve config directory: {0}")]
    DirUnavailable(String),
}

/// Planner service errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service task has stopped and no longer accepts mutations
    #[error("mutation channel closed: planner service has stopped")]
    ChannelClosed,
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Clock time outside 00:00..=23:59 or not in HH:mm form
    #[error("Invalid clock time '{0}': expected HH:mm between 00:00 and 23:59")]
    InvalidClockTime(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
