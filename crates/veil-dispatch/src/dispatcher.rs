//! Request dispatcher.
//!
//! Resolves each broker, renders its request, and hands it to the transport.
//! Brokers run concurrently up to a fixed bound; results come back in the
//! order the IDs were submitted.

use crate::error::{DispatchError, Result};
use crate::result::RemovalResult;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::transport::RemovalTransport;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use veil_broker::{render_template, BrokerDefinition, BrokerDirectory};
use veil_core::{BrokerId, DispatchConfig, RemovalStatus, Timestamp, UserData};

/// Default bound on brokers contacted at once.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Dispatches removal requests to brokers.
#[derive(Clone)]
pub struct Dispatcher {
    directory: Arc<dyn BrokerDirectory>,
    transport: Arc<dyn RemovalTransport>,
    policy: RetryPolicy,
    max_concurrent: usize,
}

impl Dispatcher {
    /// Create a dispatcher with default retry policy and concurrency.
    #[must_use]
    pub fn new(directory: Arc<dyn BrokerDirectory>, transport: Arc<dyn RemovalTransport>) -> Self {
        Self {
            directory,
            transport,
            policy: RetryPolicy::default(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Create a dispatcher configured from the dispatch settings.
    #[must_use]
    pub fn from_config(
        directory: Arc<dyn BrokerDirectory>,
        transport: Arc<dyn RemovalTransport>,
        config: &DispatchConfig,
    ) -> Self {
        Self::new(directory, transport)
            .with_retry_policy(RetryPolicy::from_config(config))
            .with_max_concurrent(config.max_concurrent)
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set how many brokers may be contacted at once (at least one).
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    /// The broker directory this dispatcher resolves IDs against.
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn BrokerDirectory> {
        &self.directory
    }

    /// Dispatch to every broker and wait for all outcomes.
    ///
    /// # Errors
    /// Returns `DispatchError::Validation` if `broker_ids` is empty or the
    /// user has no email address. Per-broker failures are reported in the
    /// results, never as an error.
    pub async fn dispatch(
        &self,
        broker_ids: &[String],
        user: &UserData,
    ) -> Result<Vec<RemovalResult>> {
        self.dispatch_with_cancel(broker_ids, user, &CancellationToken::new())
            .await
    }

    /// Like [`dispatch`](Self::dispatch), stopping early when `cancel` fires.
    ///
    /// In-flight attempts and pending backoff sleeps are abandoned; every
    /// broker without an outcome yet is reported as cancelled.
    ///
    /// # Errors
    /// Same as [`dispatch`](Self::dispatch).
    pub async fn dispatch_with_cancel(
        &self,
        broker_ids: &[String],
        user: &UserData,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemovalResult>> {
        if broker_ids.is_empty() {
            return Err(DispatchError::Validation(
                "At least one broker ID is required".to_string(),
            ));
        }
        user.validate()
            .map_err(|_| DispatchError::Validation("User data with email is required".to_string()))?;

        let broker_ids = dedupe(broker_ids);
        info!(
            brokers = broker_ids.len(),
            transport = self.transport.name(),
            "dispatching removal requests"
        );

        let mut slots: Vec<Option<RemovalResult>> = vec![None; broker_ids.len()];
        let mut in_flight = FuturesUnordered::new();

        for (index, broker_id) in broker_ids.iter().enumerate() {
            let Some(broker) = self.resolve(broker_id) else {
                debug!(broker_id = %broker_id, "unknown broker");
                slots[index] = Some(RemovalResult::broker_not_found(broker_id.as_str()));
                continue;
            };

            in_flight.push(async move { (index, self.dispatch_one(broker, user, cancel).await) });

            while in_flight.len() >= self.max_concurrent {
                if let Some((index, result)) = in_flight.next().await {
                    slots[index] = Some(result);
                }
            }
        }

        while let Some((index, result)) = in_flight.next().await {
            slots[index] = Some(result);
        }

        let results: Vec<RemovalResult> = slots.into_iter().flatten().collect();
        info!(
            brokers = results.len(),
            accepted = results.iter().filter(|r| r.success).count(),
            cancelled = cancel.is_cancelled(),
            "dispatch complete"
        );

        Ok(results)
    }

    fn resolve(&self, broker_id: &str) -> Option<BrokerDefinition> {
        let id = BrokerId::new(broker_id).ok()?;
        self.directory.lookup(&id)
    }

    async fn dispatch_one(
        &self,
        broker: BrokerDefinition,
        user: &UserData,
        cancel: &CancellationToken,
    ) -> RemovalResult {
        let content = broker
            .template()
            .map(|template| render_template(template, user))
            .unwrap_or_default();

        let mut attempts = 0;
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            outcome = retry_with_backoff(
                || self.transport.attempt_removal(&broker, user, &content),
                &self.policy,
                &mut attempts,
            ) => Some(outcome),
        };

        let name = broker.name();
        let (success, message) = match outcome {
            Some(Ok(())) => {
                info!(broker_id = %broker.id(), attempts, "removal request accepted");
                (true, format!("Removal request submitted to {name}"))
            }
            Some(Err(e)) => {
                warn!(broker_id = %broker.id(), attempts, error = %e, "removal request failed");
                (false, format!("Failed to submit request to {name}: {e}"))
            }
            None => {
                debug!(broker_id = %broker.id(), attempts, "removal request cancelled");
                (false, format!("Removal request to {name} cancelled"))
            }
        };

        RemovalResult {
            broker_id: broker.id().to_string(),
            broker_name: Some(name.to_string()),
            success,
            status: if success {
                RemovalStatus::Pending
            } else {
                RemovalStatus::Failed
            },
            request_date: Some(Timestamp::now()),
            request_content: Some(content),
            message,
            attempts,
        }
    }
}

/// Drop repeated IDs, keeping the first occurrence's position.
fn dedupe(broker_ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    broker_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
