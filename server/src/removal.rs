//! Removal request endpoints.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::info;
use veil_core::{BatchStatus, RemovalStatus, Timestamp, UserData};
use veil_db::{removal_requests, RemovalBatchRecord, RemovalRequestRecord};
use veil_dispatch::RemovalRequestBatch;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRemovalRequest {
    #[serde(default)]
    pub broker_ids: Vec<String>,
    #[serde(default)]
    pub user_data: Option<UserData>,
}

#[derive(Debug, Serialize)]
pub struct SubmitRemovalResponse {
    pub success: bool,
    #[serde(flatten)]
    pub batch: RemovalRequestBatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Aggregate view of a stored batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalStatusView {
    pub request_id: String,
    pub status: BatchStatus,
    pub last_updated: Timestamp,
    pub brokers: Vec<BrokerStatusView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerStatusView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: RemovalStatus,
    pub request_date: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<Timestamp>,
}

impl From<RemovalBatchRecord> for RemovalStatusView {
    fn from(batch: RemovalBatchRecord) -> Self {
        let status = batch.status();
        Self {
            request_id: batch.request_id.to_string(),
            status,
            last_updated: batch.last_updated,
            brokers: batch
                .requests
                .into_iter()
                .map(|r| BrokerStatusView {
                    id: r.broker_id,
                    name: r.broker_name,
                    status: r.status,
                    request_date: r.request_date,
                    completion_date: r.completion_date,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /remove`: dispatch to every broker, store the batch, return it.
///
/// Dropping the handler future (client gone) cancels brokers still in flight.
pub async fn submit_removal(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRemovalRequest>, JsonRejection>,
) -> Result<Json<SubmitRemovalResponse>, ApiError> {
    let Json(request) = payload?;
    let user = request.user_data.unwrap_or_default();

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let results = state
        .dispatcher
        .dispatch_with_cancel(&request.broker_ids, &user, &cancel)
        .await?;
    let batch = RemovalRequestBatch::aggregate(results);

    let record = batch_record(&batch, user.email().unwrap_or_default());
    removal_requests::insert_batch(state.db.pool(), &record)
        .await
        .map_err(|e| ApiError::internal("Failed to send removal requests", e))?;

    info!(
        request_id = %batch.request_id,
        brokers = batch.broker_count,
        accepted = batch.success_count,
        "removal batch stored"
    );

    Ok(Json(SubmitRemovalResponse {
        success: true,
        batch,
    }))
}

/// `GET /remove?requestId=…`: aggregate status of a stored batch.
pub async fn removal_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<RemovalStatusView>, ApiError> {
    let request_id = query
        .request_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Request ID is required".to_string()))?;

    let batch = removal_requests::get_batch(state.db.pool(), request_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch removal request status", e))?
        .ok_or_else(|| ApiError::NotFound(format!("Removal request '{request_id}' not found")))?;

    Ok(Json(batch.into()))
}

/// `PUT /remove/:request_id/brokers/:broker_id`: move one broker's request
/// along the status state machine.
pub async fn update_broker_status(
    State(state): State<AppState>,
    Path((request_id, broker_id)): Path<(String, String)>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<RemovalStatusView>, ApiError> {
    let Json(request) = payload?;
    let status = RemovalStatus::from_str(request.status.trim())?;

    let batch =
        removal_requests::update_request_status(state.db.pool(), &request_id, &broker_id, status)
            .await?;

    Ok(Json(batch.into()))
}

fn batch_record(batch: &RemovalRequestBatch, email: &str) -> RemovalBatchRecord {
    RemovalBatchRecord {
        request_id: batch.request_id.clone(),
        email: email.to_string(),
        request_date: batch.request_date,
        last_updated: batch.request_date,
        requests: batch
            .results
            .iter()
            .map(|r| RemovalRequestRecord {
                broker_id: r.broker_id.clone(),
                broker_name: r.broker_name.clone(),
                success: r.success,
                status: r.status,
                message: r.message.clone(),
                attempts: r.attempts,
                request_content: r.request_content.clone(),
                request_date: r.request_date.unwrap_or(batch.request_date),
                completion_date: None,
            })
            .collect(),
    }
}
