//! Scan orchestration.

use crate::error::{Result, ScanError};
use crate::fixtures::{StaticBreachSource, StaticBrokerExposureSource, StaticDarkWebSource};
use crate::source::{BreachSource, BrokerExposureSource};
use crate::types::{ScanOptions, ScanReport};
use std::sync::Arc;
use tracing::{info, warn};
use veil_core::Timestamp;

/// Runs breach, dark-web and broker-exposure lookups and merges them.
#[derive(Clone)]
pub struct ScanService {
    breaches: Arc<dyn BreachSource>,
    dark_web: Arc<dyn BreachSource>,
    brokers: Arc<dyn BrokerExposureSource>,
}

impl ScanService {
    /// Create a service over the given sources.
    #[must_use]
    pub fn new(
        breaches: Arc<dyn BreachSource>,
        dark_web: Arc<dyn BreachSource>,
        brokers: Arc<dyn BrokerExposureSource>,
    ) -> Self {
        Self {
            breaches,
            dark_web,
            brokers,
        }
    }

    /// A service backed entirely by static fixtures.
    #[must_use]
    pub fn with_fixtures() -> Self {
        Self::new(
            Arc::new(StaticBreachSource),
            Arc::new(StaticDarkWebSource),
            Arc::new(StaticBrokerExposureSource),
        )
    }

    /// Swap the breach source, keeping the others.
    #[must_use]
    pub fn with_breach_source(mut self, source: Arc<dyn BreachSource>) -> Self {
        self.breaches = source;
        self
    }

    /// Scan `email`. The selected lookups run concurrently; if any of them
    /// fails the whole scan fails.
    ///
    /// # Errors
    /// Returns `ScanError::Validation` for a blank email, or the first source
    /// error encountered.
    pub async fn scan(&self, email: &str, options: ScanOptions) -> Result<ScanReport> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ScanError::Validation("Email is required".to_string()));
        }

        let breaches = self.breaches.breaches(email);
        let dark_web = async {
            if options.include_dark_web {
                self.dark_web.breaches(email).await
            } else {
                Ok(Vec::new())
            }
        };
        let brokers = async {
            if options.include_data_brokers {
                self.brokers.exposures(email).await
            } else {
                Ok(Vec::new())
            }
        };

        let (mut breaches, dark_web, data_brokers) =
            tokio::try_join!(breaches, dark_web, brokers).inspect_err(|e| {
                warn!(error = %e, "scan lookup failed");
            })?;
        breaches.extend(dark_web);

        let report = ScanReport {
            scan_id: uuid::Uuid::new_v4().to_string(),
            breaches,
            data_brokers,
            scan_date: Timestamp::now(),
        };

        info!(
            scan_id = %report.scan_id,
            breach_source = self.breaches.name(),
            breaches = report.breaches.len(),
            brokers = report.data_brokers.len(),
            "scan complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Breach, BrokerExposure};
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl BreachSource for FailingSource {
        async fn breaches(&self, _email: &str) -> Result<Vec<Breach>> {
            Err(ScanError::Internal("source offline".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[async_trait]
    impl BrokerExposureSource for FailingSource {
        async fn exposures(&self, _email: &str) -> Result<Vec<BrokerExposure>> {
            Err(ScanError::Internal("source offline".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_full_scan_merges_sources() {
        let report = ScanService::with_fixtures()
            .scan("jane@x.com", ScanOptions::default())
            .await
            .expect("scan");

        let names: Vec<&str> = report.breaches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["LinkedIn", "Adobe", "Dark Web Marketplace"]);
        assert_eq!(report.data_brokers.len(), 3);
        assert_eq!(report.scan_id.len(), 36);
    }

    #[tokio::test]
    async fn test_options_skip_lookups() {
        let service = ScanService::new(
            Arc::new(StaticBreachSource),
            Arc::new(FailingSource),
            Arc::new(FailingSource),
        );

        let report = service
            .scan(
                "jane@x.com",
                ScanOptions {
                    include_dark_web: false,
                    include_data_brokers: false,
                },
            )
            .await
            .expect("skipped sources are never called");

        assert_eq!(report.breaches.len(), 2);
        assert!(report.data_brokers.is_empty());
    }

    #[tokio::test]
    async fn test_any_failure_fails_scan() {
        let service = ScanService::with_fixtures().with_breach_source(Arc::new(FailingSource));
        let result = service.scan("jane@x.com", ScanOptions::default()).await;
        assert!(matches!(result, Err(ScanError::Internal(_))));
    }

    #[tokio::test]
    async fn test_blank_email_rejected() {
        let result = ScanService::with_fixtures()
            .scan("   ", ScanOptions::default())
            .await;
        assert!(matches!(result, Err(ScanError::Validation(ref m)) if m == "Email is required"));
    }
}
