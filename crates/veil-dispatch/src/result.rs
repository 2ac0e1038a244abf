//! Per-broker outcomes and the batch that aggregates them.

use serde::{Deserialize, Serialize};
use veil_core::{RemovalStatus, RequestId, Timestamp};

/// Outcome of dispatching to one broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalResult {
    /// Broker identifier as submitted
    pub broker_id: String,
    /// Broker display name; absent for unknown brokers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_name: Option<String>,
    /// Whether the transport accepted the request
    pub success: bool,
    /// `pending` when accepted, otherwise `failed`
    pub status: RemovalStatus,
    /// When the outcome was generated; absent for unknown brokers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_date: Option<Timestamp>,
    /// Rendered request; absent for unknown brokers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_content: Option<String>,
    /// Human-readable outcome
    pub message: String,
    /// Transport attempts made
    pub attempts: u32,
}

impl RemovalResult {
    /// Result for an ID the broker directory does not know.
    #[must_use]
    pub fn broker_not_found(broker_id: impl Into<String>) -> Self {
        Self {
            broker_id: broker_id.into(),
            broker_name: None,
            success: false,
            status: RemovalStatus::Failed,
            request_date: None,
            request_content: None,
            message: "Broker not found".to_string(),
            attempts: 0,
        }
    }
}

/// Everything produced by one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalRequestBatch {
    /// Batch identifier
    pub request_id: RequestId,
    /// Per-broker outcomes, in submission order
    pub results: Vec<RemovalResult>,
    /// Submission time
    pub request_date: Timestamp,
    /// Number of brokers in the batch
    pub broker_count: usize,
    /// Number of brokers that accepted the request
    pub success_count: usize,
}

impl RemovalRequestBatch {
    /// Wrap dispatcher output in a freshly identified batch.
    #[must_use]
    pub fn aggregate(results: Vec<RemovalResult>) -> Self {
        Self::aggregate_with(RequestId::generate(), Timestamp::now(), results)
    }

    /// Wrap dispatcher output with a known ID and submission time.
    #[must_use]
    pub fn aggregate_with(
        request_id: RequestId,
        request_date: Timestamp,
        results: Vec<RemovalResult>,
    ) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        Self {
            request_id,
            broker_count: results.len(),
            success_count,
            results,
            request_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(id: &str) -> RemovalResult {
        RemovalResult {
            broker_id: id.to_string(),
            broker_name: Some("Spokeo".to_string()),
            success: true,
            status: RemovalStatus::Pending,
            request_date: Some(Timestamp::now()),
            request_content: Some("Please remove".to_string()),
            message: "Removal request submitted to Spokeo".to_string(),
            attempts: 1,
        }
    }

    #[test]
    fn test_aggregate_counts() {
        let batch = RemovalRequestBatch::aggregate(vec![
            accepted("3"),
            RemovalResult::broker_not_found("999"),
            accepted("5"),
        ]);

        assert_eq!(batch.broker_count, 3);
        assert_eq!(batch.success_count, 2);
        assert_eq!(batch.results[1].message, "Broker not found");
        assert!(RequestId::new(batch.request_id.as_str()).is_ok());
    }

    #[test]
    fn test_unknown_broker_serialization_omits_broker_fields() {
        let json = serde_json::to_value(RemovalResult::broker_not_found("999"))
            .expect("serialize result");

        assert_eq!(
            json,
            serde_json::json!({
                "brokerId": "999",
                "success": false,
                "status": "failed",
                "message": "Broker not found",
                "attempts": 0
            })
        );
    }

    #[test]
    fn test_batch_serialization_is_camel_case() {
        let batch = RemovalRequestBatch::aggregate(vec![accepted("3")]);
        let json = serde_json::to_value(&batch).expect("serialize batch");

        assert!(json["requestId"].is_string());
        assert!(json["requestDate"].is_string());
        assert_eq!(json["brokerCount"], 1);
        assert_eq!(json["successCount"], 1);
        assert_eq!(json["results"][0]["brokerName"], "Spokeo");
        assert_eq!(json["results"][0]["status"], "pending");
    }
}
