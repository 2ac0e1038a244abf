//! Scan report history.
//!
//! Reports are stored as serialized JSON so the schema does not track the
//! shape of scanner output.

use crate::error::Result;
use crate::removal_requests::parse_timestamp;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Pool, Row, Sqlite};
use veil_core::Timestamp;

/// A stored scan report.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord<T> {
    /// Scan identifier
    pub scan_id: String,
    /// When the scan ran
    pub scan_date: Timestamp,
    /// Deserialized report
    pub report: T,
}

/// Store a scan report.
///
/// # Errors
/// Returns `DatabaseError` if serialization or the insert fails.
pub async fn insert_scan<T: Serialize>(
    pool: &Pool<Sqlite>,
    scan_id: &str,
    scan_date: Timestamp,
    report: &T,
) -> Result<()> {
    let report = serde_json::to_string(report)?;

    sqlx::query("INSERT INTO scans (id, scan_date, report) VALUES (?, ?, ?)")
        .bind(scan_id)
        .bind(scan_date.to_rfc3339())
        .bind(report)
        .execute(pool)
        .await?;

    tracing::debug!(scan_id, "stored scan report");
    Ok(())
}

/// Load a scan report by ID.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or the stored report does not
/// deserialize into `T`.
pub async fn get_scan<T: DeserializeOwned>(
    pool: &Pool<Sqlite>,
    scan_id: &str,
) -> Result<Option<ScanRecord<T>>> {
    let Some(row) = sqlx::query("SELECT id, scan_date, report FROM scans WHERE id = ?")
        .bind(scan_id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let scan_date: String = row.try_get("scan_date")?;
    let report: String = row.try_get("report")?;

    Ok(Some(ScanRecord {
        scan_id: row.try_get("id")?,
        scan_date: parse_timestamp(&scan_date)?,
        report: serde_json::from_str(&report)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DatabaseError};
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Report {
        breaches: Vec<String>,
    }

    #[tokio::test]
    async fn test_insert_and_get_scan() {
        let db = Database::connect("sqlite::memory:", 1)
            .await
            .expect("open in-memory database");
        db.run_migrations().await.expect("run migrations");

        let report = Report {
            breaches: vec!["LinkedIn".to_string(), "Adobe".to_string()],
        };
        let scan_date = Timestamp::now();
        insert_scan(db.pool(), "scan-1", scan_date, &report)
            .await
            .expect("insert scan");

        let stored = get_scan::<Report>(db.pool(), "scan-1")
            .await
            .expect("query scan")
            .expect("scan exists");
        assert_eq!(stored.report, report);
        assert_eq!(stored.scan_date.to_rfc3339(), scan_date.to_rfc3339());

        assert!(get_scan::<Report>(db.pool(), "scan-2")
            .await
            .expect("query scan")
            .is_none());
    }

    #[tokio::test]
    async fn test_get_scan_with_wrong_shape() {
        let db = Database::connect("sqlite::memory:", 1)
            .await
            .expect("open in-memory database");
        db.run_migrations().await.expect("run migrations");

        insert_scan(db.pool(), "scan-1", Timestamp::now(), &vec![1, 2, 3])
            .await
            .expect("insert scan");

        let result = get_scan::<Report>(db.pool(), "scan-1").await;
        assert!(matches!(result, Err(DatabaseError::Serialization(_))));
    }
}
