//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`. Library errors convert into
//! the variant matching their class; unexpected failures are logged here and
//! reach the client only as a generic message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt::Display;
use veil_core::VeilError;
use veil_db::DatabaseError;
use veil_dispatch::DispatchError;
use veil_scanner::ScanError;

/// Error returned from request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or incomplete input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown request, scan or broker (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Status change the removal state machine forbids (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected failure; carries the client-facing message only (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Log `source` and produce a 500 that exposes only `message`.
    pub fn internal(message: &str, source: impl Display) -> Self {
        tracing::error!(error = %source, "{message}");
        Self::Internal(message.to_string())
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message(),
        }));

        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<VeilError> for ApiError {
    fn from(err: VeilError) -> Self {
        match err {
            VeilError::Validation(msg) => Self::BadRequest(msg),
            VeilError::NotFound(msg) => Self::NotFound(msg),
            VeilError::InvalidTransition(msg) => Self::Conflict(msg),
            other => Self::internal("Internal error", other),
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Validation(msg) => Self::BadRequest(msg),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => Self::NotFound(msg),
            DatabaseError::InvalidTransition(msg) => Self::Conflict(msg),
            other => Self::internal("Database error", other),
        }
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Validation(msg) => Self::BadRequest(msg),
            other => Self::internal("Failed to scan for breaches", other),
        }
    }
}

/// Failure to assemble the service at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Broker definitions could not be loaded
    #[error("broker definitions: {0}")]
    Brokers(#[from] veil_broker::BrokerError),

    /// The configured transport could not be built
    #[error("removal transport: {0}")]
    Transport(#[from] veil_dispatch::TransportError),

    /// The database could not be opened or migrated
    #[error("database: {0}")]
    Database(#[from] DatabaseError),

    /// The breach provider client could not be built
    #[error("scanner: {0}")]
    Scanner(#[from] ScanError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let (status, body) = body_json(ApiError::BadRequest("Request ID is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Request ID is required" }));
    }

    #[tokio::test]
    async fn test_internal_hides_source() {
        let err = ApiError::internal("Failed to send removal requests", "disk full");
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send removal requests");
    }

    #[test]
    fn test_database_error_mapping() {
        let err: ApiError = DatabaseError::NotFound("Removal request 'x' not found".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ApiError = DatabaseError::InvalidTransition("completed to pending".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_mapping() {
        let err: ApiError =
            DispatchError::Validation("At least one broker ID is required".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = ScanError::Validation("Email is required".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = VeilError::InvalidTransition("nope".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
