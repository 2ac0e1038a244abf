//! Error types for exposure scanning.

use thiserror::Error;

/// Errors that can occur while scanning.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Missing or malformed scan input
    #[error("{0}")]
    Validation(String),

    /// Source rejected the credentials
    #[error("authentication failed for {provider}")]
    AuthenticationFailed {
        /// Source name
        provider: String,
    },

    /// Source is throttling requests
    #[error("rate limit exceeded for {provider}, retry after {retry_after_secs:?}s")]
    RateLimited {
        /// Source name
        provider: String,
        /// Value of the `retry-after` header, if sent
        retry_after_secs: Option<u64>,
    },

    /// Non-success HTTP status
    #[error("API error ({provider}): status {status}, {message}")]
    Api {
        /// Source name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("failed to parse response from {provider}: {message}")]
    Parse {
        /// Source name
        provider: String,
        /// Parser message
        message: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
