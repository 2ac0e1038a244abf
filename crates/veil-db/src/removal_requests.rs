//! Persistence for removal batches and their per-broker requests.
//!
//! A batch is written once, after dispatch completes. Afterwards only the
//! per-broker status moves, and only along the removal state machine.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use veil_core::{BatchStatus, RemovalStatus, RequestId, Timestamp};

/// One broker's request within a stored batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalRequestRecord {
    /// Broker identifier as submitted
    pub broker_id: String,
    /// Broker display name, absent when the broker was unknown
    pub broker_name: Option<String>,
    /// Whether the transport accepted the request
    pub success: bool,
    /// Current status
    pub status: RemovalStatus,
    /// Outcome message from dispatch
    pub message: String,
    /// Transport attempts made during dispatch
    pub attempts: u32,
    /// Rendered request content
    pub request_content: Option<String>,
    /// When the request was generated
    pub request_date: Timestamp,
    /// When the broker confirmed removal
    pub completion_date: Option<Timestamp>,
}

/// A stored removal batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalBatchRecord {
    /// Batch identifier
    pub request_id: RequestId,
    /// Email address the removal was requested for
    pub email: String,
    /// Submission time
    pub request_date: Timestamp,
    /// Last time any request in the batch changed
    pub last_updated: Timestamp,
    /// Requests in submission order
    pub requests: Vec<RemovalRequestRecord>,
}

impl RemovalBatchRecord {
    /// Aggregate status across every broker in the batch.
    #[must_use]
    pub fn status(&self) -> BatchStatus {
        BatchStatus::aggregate(self.requests.iter().map(|r| r.status))
    }
}

/// Store a new batch and all of its requests atomically.
///
/// # Errors
/// Returns `DatabaseError::Sqlx` if the insert fails (including a repeated
/// request ID).
pub async fn insert_batch(pool: &Pool<Sqlite>, batch: &RemovalBatchRecord) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO removal_batches (id, email, request_date, last_updated)
         VALUES (?, ?, ?, ?)",
    )
    .bind(batch.request_id.as_str())
    .bind(&batch.email)
    .bind(batch.request_date.to_rfc3339())
    .bind(batch.last_updated.to_rfc3339())
    .execute(&mut *tx)
    .await?;

    for (position, request) in batch.requests.iter().enumerate() {
        #[allow(clippy::cast_possible_wrap)]
        let position = position as i64;

        sqlx::query(
            "INSERT INTO removal_requests
                (batch_id, position, broker_id, broker_name, success, status, message,
                 attempts, request_content, request_date, completion_date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(batch.request_id.as_str())
        .bind(position)
        .bind(&request.broker_id)
        .bind(&request.broker_name)
        .bind(request.success)
        .bind(request.status.as_str())
        .bind(&request.message)
        .bind(i64::from(request.attempts))
        .bind(&request.request_content)
        .bind(request.request_date.to_rfc3339())
        .bind(request.completion_date.map(|t| t.to_rfc3339()))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        request_id = %batch.request_id,
        brokers = batch.requests.len(),
        "stored removal batch"
    );

    Ok(())
}

/// Load a batch with its requests in submission order.
///
/// Returns `None` if no batch has this ID.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or a stored value is malformed.
pub async fn get_batch(pool: &Pool<Sqlite>, request_id: &str) -> Result<Option<RemovalBatchRecord>> {
    let Some(batch_row) = sqlx::query(
        "SELECT id, email, request_date, last_updated FROM removal_batches WHERE id = ?",
    )
    .bind(request_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let rows = sqlx::query(
        "SELECT broker_id, broker_name, success, status, message, attempts, request_content,
                request_date, completion_date
         FROM removal_requests WHERE batch_id = ? ORDER BY position",
    )
    .bind(request_id)
    .fetch_all(pool)
    .await?;

    let requests = rows
        .iter()
        .map(parse_request_row)
        .collect::<Result<Vec<_>>>()?;

    let id: String = batch_row.try_get("id")?;
    let request_date: String = batch_row.try_get("request_date")?;
    let last_updated: String = batch_row.try_get("last_updated")?;

    Ok(Some(RemovalBatchRecord {
        request_id: RequestId::new(id).map_err(|e| DatabaseError::Decode(e.to_string()))?,
        email: batch_row.try_get("email")?,
        request_date: parse_timestamp(&request_date)?,
        last_updated: parse_timestamp(&last_updated)?,
        requests,
    }))
}

/// Move one broker's request in a batch to `new_status`.
///
/// Reaching `completed` stamps the completion date. Returns the updated batch.
///
/// The write only applies if the row still holds the status it was validated
/// against. When a concurrent update got there first the new status is
/// re-validated against the fresh one, so a lost race surfaces as
/// `InvalidTransition` rather than a lock error.
///
/// # Errors
/// Returns `DatabaseError::NotFound` if the batch or broker is unknown, and
/// `DatabaseError::InvalidTransition` if the state machine forbids the move.
pub async fn update_request_status(
    pool: &Pool<Sqlite>,
    request_id: &str,
    broker_id: &str,
    new_status: RemovalStatus,
) -> Result<RemovalBatchRecord> {
    // Every applied write moves the row forward in an acyclic state machine,
    // so this loop runs at most once per remaining transition.
    let (current, next) = loop {
        let current = current_status(pool, request_id, broker_id).await?;
        let next = current
            .transition(new_status)
            .map_err(|e| DatabaseError::InvalidTransition(e.to_string()))?;

        let now = Timestamp::now();
        let completion_date = (next == RemovalStatus::Completed).then(|| now.to_rfc3339());

        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE removal_requests
             SET status = ?, completion_date = COALESCE(?, completion_date)
             WHERE batch_id = ? AND broker_id = ? AND status = ?",
        )
        .bind(next.as_str())
        .bind(completion_date)
        .bind(request_id)
        .bind(broker_id)
        .bind(current.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            tracing::debug!(
                request_id,
                broker_id,
                expected = %current,
                "removal request status changed concurrently, retrying"
            );
            continue;
        }

        sqlx::query("UPDATE removal_batches SET last_updated = ? WHERE id = ?")
            .bind(now.to_rfc3339())
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        break (current, next);
    };

    tracing::info!(
        request_id,
        broker_id,
        from = %current,
        to = %next,
        "removal request status updated"
    );

    get_batch(pool, request_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Removal request '{request_id}' not found")))
}

async fn current_status(
    pool: &Pool<Sqlite>,
    request_id: &str,
    broker_id: &str,
) -> Result<RemovalStatus> {
    let current: Option<String> = sqlx::query_scalar(
        "SELECT status FROM removal_requests WHERE batch_id = ? AND broker_id = ?",
    )
    .bind(request_id)
    .bind(broker_id)
    .fetch_optional(pool)
    .await?;

    if let Some(current) = current {
        return parse_status(&current);
    }

    let batch_exists: Option<String> =
        sqlx::query_scalar("SELECT id FROM removal_batches WHERE id = ?")
            .bind(request_id)
            .fetch_optional(pool)
            .await?;

    Err(DatabaseError::NotFound(if batch_exists.is_some() {
        format!("Broker '{broker_id}' is not part of request '{request_id}'")
    } else {
        format!("Removal request '{request_id}' not found")
    }))
}

fn parse_request_row(row: &SqliteRow) -> Result<RemovalRequestRecord> {
    let status: String = row.try_get("status")?;
    let attempts: i64 = row.try_get("attempts")?;
    let request_date: String = row.try_get("request_date")?;
    let completion_date: Option<String> = row.try_get("completion_date")?;

    Ok(RemovalRequestRecord {
        broker_id: row.try_get("broker_id")?,
        broker_name: row.try_get("broker_name")?,
        success: row.try_get("success")?,
        status: parse_status(&status)?,
        message: row.try_get("message")?,
        attempts: u32::try_from(attempts)
            .map_err(|e| DatabaseError::Decode(format!("invalid attempts '{attempts}': {e}")))?,
        request_content: row.try_get("request_content")?,
        request_date: parse_timestamp(&request_date)?,
        completion_date: completion_date.as_deref().map(parse_timestamp).transpose()?,
    })
}

fn parse_status(value: &str) -> Result<RemovalStatus> {
    RemovalStatus::from_str(value).map_err(|e| DatabaseError::Decode(e.to_string()))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<Timestamp> {
    Timestamp::from_rfc3339(value).map_err(|e| DatabaseError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn create_test_database() -> Database {
        let db = Database::connect("sqlite::memory:", 1)
            .await
            .expect("open in-memory database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    fn request(broker_id: &str, status: RemovalStatus) -> RemovalRequestRecord {
        RemovalRequestRecord {
            broker_id: broker_id.to_string(),
            broker_name: Some(format!("Broker {broker_id}")),
            success: status != RemovalStatus::Failed,
            status,
            message: format!("Removal request submitted to Broker {broker_id}"),
            attempts: 1,
            request_content: Some("Please remove Jane Doe".to_string()),
            request_date: Timestamp::now(),
            completion_date: None,
        }
    }

    fn batch(requests: Vec<RemovalRequestRecord>) -> RemovalBatchRecord {
        let now = Timestamp::now();
        RemovalBatchRecord {
            request_id: RequestId::generate(),
            email: "jane@x.com".to_string(),
            request_date: now,
            last_updated: now,
            requests,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_batch_preserves_order() {
        let db = create_test_database().await;
        let mut unknown = request("999", RemovalStatus::Failed);
        unknown.broker_name = None;
        unknown.request_content = None;
        unknown.attempts = 0;
        unknown.message = "Broker not found".to_string();

        let stored = batch(vec![
            request("5", RemovalStatus::Pending),
            unknown,
            request("1", RemovalStatus::Pending),
        ]);
        insert_batch(db.pool(), &stored).await.expect("insert batch");

        let loaded = get_batch(db.pool(), stored.request_id.as_str())
            .await
            .expect("query batch")
            .expect("batch exists");

        let ids: Vec<&str> = loaded.requests.iter().map(|r| r.broker_id.as_str()).collect();
        assert_eq!(ids, vec!["5", "999", "1"]);
        assert_eq!(loaded.requests[1].broker_name, None);
        assert_eq!(loaded.requests[1].message, "Broker not found");
        assert_eq!(loaded.email, "jane@x.com");
        assert_eq!(loaded.status(), BatchStatus::InProgress);
    }

    #[tokio::test]
    async fn test_get_unknown_batch() {
        let db = create_test_database().await;
        let loaded = get_batch(db.pool(), "5f2b7d4e-1c3a-4e8b-9f10-0a1b2c3d4e5f")
            .await
            .expect("query batch");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_update_status_follows_state_machine() {
        let db = create_test_database().await;
        let stored = batch(vec![request("1", RemovalStatus::Pending)]);
        insert_batch(db.pool(), &stored).await.expect("insert batch");
        let id = stored.request_id.as_str();

        let updated = update_request_status(db.pool(), id, "1", RemovalStatus::InProgress)
            .await
            .expect("pending -> in_progress");
        assert_eq!(updated.requests[0].status, RemovalStatus::InProgress);
        assert!(updated.requests[0].completion_date.is_none());
        assert_eq!(updated.status(), BatchStatus::InProgress);

        let updated = update_request_status(db.pool(), id, "1", RemovalStatus::Completed)
            .await
            .expect("in_progress -> completed");
        assert_eq!(updated.requests[0].status, RemovalStatus::Completed);
        assert!(updated.requests[0].completion_date.is_some());
        assert_eq!(updated.status(), BatchStatus::Completed);
        assert!(updated.last_updated >= stored.last_updated);

        let result = update_request_status(db.pool(), id, "1", RemovalStatus::Pending).await;
        assert!(matches!(result, Err(DatabaseError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_update_status_unknown_targets() {
        let db = create_test_database().await;
        let stored = batch(vec![request("1", RemovalStatus::Pending)]);
        insert_batch(db.pool(), &stored).await.expect("insert batch");

        let result = update_request_status(
            db.pool(),
            stored.request_id.as_str(),
            "2",
            RemovalStatus::Completed,
        )
        .await;
        match result {
            Err(DatabaseError::NotFound(msg)) => assert!(msg.contains("Broker '2'")),
            other => panic!("expected NotFound, got {other:?}"),
        }

        let result = update_request_status(
            db.pool(),
            "5f2b7d4e-1c3a-4e8b-9f10-0a1b2c3d4e5f",
            "1",
            RemovalStatus::Completed,
        )
        .await;
        match result {
            Err(DatabaseError::NotFound(msg)) => assert!(msg.contains("not found")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_request_id_rejected() {
        let db = create_test_database().await;
        let stored = batch(vec![request("1", RemovalStatus::Pending)]);
        insert_batch(db.pool(), &stored).await.expect("insert batch");

        let result = insert_batch(db.pool(), &stored).await;
        assert!(matches!(result, Err(DatabaseError::Sqlx(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_conflict_instead_of_failing() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let url = format!("sqlite:{}", dir.path().join("veil.db").display());
        let db = Database::connect(&url, 5).await.expect("open file database");
        db.run_migrations().await.expect("run migrations");

        for _ in 0..10 {
            let stored = batch(vec![request("1", RemovalStatus::Pending)]);
            insert_batch(db.pool(), &stored).await.expect("insert batch");

            let handles: Vec<_> = [RemovalStatus::Completed, RemovalStatus::Failed]
                .into_iter()
                .map(|status| {
                    let pool = db.pool().clone();
                    let id = stored.request_id.to_string();
                    tokio::spawn(async move { update_request_status(&pool, &id, "1", status).await })
                })
                .collect();

            let mut applied = 0;
            for handle in handles {
                match handle.await.expect("update task") {
                    Ok(_) => applied += 1,
                    Err(DatabaseError::InvalidTransition(_)) => {}
                    Err(other) => panic!("expected a transition conflict, got {other:?}"),
                }
            }
            assert_eq!(applied, 1);

            let loaded = get_batch(db.pool(), stored.request_id.as_str())
                .await
                .expect("query batch")
                .expect("batch exists");
            assert!(loaded.requests[0].status.is_terminal());
        }

        db.close().await;
    }
}
