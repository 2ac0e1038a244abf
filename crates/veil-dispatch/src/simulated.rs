//! Transport that pretends to contact brokers.

use crate::error::TransportError;
use crate::transport::RemovalTransport;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use veil_broker::BrokerDefinition;
use veil_core::{DispatchConfig, UserData};

/// Accepts each request with a fixed probability after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    success_rate: f64,
    latency: Duration,
}

impl SimulatedTransport {
    /// Create a transport with the given acceptance probability (clamped to
    /// `0.0..=1.0`) and per-attempt latency.
    #[must_use]
    pub fn new(success_rate: f64, latency: Duration) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            latency,
        }
    }

    /// Build from the dispatch configuration.
    #[must_use]
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(
            config.success_rate,
            Duration::from_millis(config.simulated_latency_ms),
        )
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new(0.9, Duration::from_millis(500))
    }
}

#[async_trait]
impl RemovalTransport for SimulatedTransport {
    async fn attempt_removal(
        &self,
        broker: &BrokerDefinition,
        _user: &UserData,
        _content: &str,
    ) -> Result<(), TransportError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let accepted = rand::thread_rng().gen_bool(self.success_rate);
        if accepted {
            tracing::trace!(broker_id = %broker.id(), "simulated delivery accepted");
            Ok(())
        } else {
            Err(TransportError::Permanent(
                "broker did not accept the request".to_string(),
            ))
        }
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_broker::BrokerRegistry;
    use veil_broker::BrokerDirectory;
    use veil_core::BrokerId;

    fn spokeo() -> BrokerDefinition {
        BrokerRegistry::with_defaults()
            .lookup(&BrokerId::new("3").expect("valid broker ID"))
            .expect("spokeo is built in")
    }

    #[tokio::test]
    async fn test_always_accepts() {
        let transport = SimulatedTransport::new(1.0, Duration::ZERO);
        let user = UserData::new("Jane", "Doe", "jane@x.com");
        for _ in 0..20 {
            transport
                .attempt_removal(&spokeo(), &user, "content")
                .await
                .expect("accepted");
        }
    }

    #[tokio::test]
    async fn test_always_rejects_permanently() {
        let transport = SimulatedTransport::new(0.0, Duration::ZERO);
        let user = UserData::new("Jane", "Doe", "jane@x.com");
        let err = transport
            .attempt_removal(&spokeo(), &user, "content")
            .await
            .expect_err("rejected");
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "broker did not accept the request");
    }

    #[test]
    fn test_rate_is_clamped() {
        assert!((SimulatedTransport::new(3.0, Duration::ZERO).success_rate - 1.0).abs() < f64::EPSILON);
        assert!(SimulatedTransport::new(-1.0, Duration::ZERO).success_rate.abs() < f64::EPSILON);
    }
}
