//! Core error types for the Veil service.
//!
//! This module defines the central error type shared by the subsystems.
//! Each variant maps onto one class of the service's error taxonomy so the
//! HTTP boundary can translate it without inspecting messages.

use thiserror::Error;

/// Central error type for Veil operations.
#[derive(Error, Debug)]
pub enum VeilError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (missing or malformed input)
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// A state change that the removal state machine forbids
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Delivery of a removal request failed
    #[error("transport error: {0}")]
    Transport(String),

    /// Database errors (connection, queries, migrations)
    #[error("database error: {0}")]
    Database(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `VeilError`.
pub type Result<T> = std::result::Result<T, VeilError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
