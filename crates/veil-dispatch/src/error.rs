//! Error types for removal dispatch.

use thiserror::Error;

/// Errors that reject a whole dispatch before any broker is contacted.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),
}

/// Failure to deliver one removal request.
///
/// Only transient failures are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The broker or relay may accept the request if asked again
    #[error("{0}")]
    Transient(String),

    /// Retrying cannot help
    #[error("{0}")]
    Permanent(String),
}

impl TransportError {
    /// Whether the retry policy should try again.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
