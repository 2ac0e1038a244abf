//! Exposure scan endpoints.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;
use veil_db::scans;
use veil_scanner::{ScanOptions, ScanReport};

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub options: ScanOptions,
}

/// `POST /scan`: run a scan and keep the report.
pub async fn run_scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanReport>, ApiError> {
    let Json(request) = payload?;

    let report = state.scanner.scan(&request.email, request.options).await?;

    scans::insert_scan(state.db.pool(), &report.scan_id, report.scan_date, &report)
        .await
        .map_err(|e| ApiError::internal("Failed to scan for breaches", e))?;

    Ok(Json(report))
}

/// `GET /scan/:scan_id`: a previously stored report.
pub async fn get_scan(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
) -> Result<Json<ScanReport>, ApiError> {
    let record = scans::get_scan::<ScanReport>(state.db.pool(), &scan_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Scan '{scan_id}' not found")))?;

    Ok(Json(record.report))
}
