//! Veil HTTP service.
//!
//! A thin axum shell over the `veil-*` crates: it decodes requests, calls the
//! dispatcher, scanner and database, and maps their errors onto HTTP status
//! codes. Business logic lives in `crates/`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod brokers;
pub mod error;
pub mod removal;
pub mod scan;
pub mod state;

pub use error::{ApiError, StartupError};
pub use state::AppState;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// Build the service router.
pub fn build_router(state: AppState, cors_allow_any: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route(
            "/remove",
            post(removal::submit_removal).get(removal::removal_status),
        )
        .route(
            "/remove/:request_id/brokers/:broker_id",
            put(removal::update_broker_status),
        )
        .route("/scan", post(scan::run_scan))
        .route("/scan/:scan_id", get(scan::get_scan))
        .route("/brokers", get(brokers::list_brokers))
        .route("/templates", get(brokers::list_templates))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_allow_any {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,veil=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }
}
