//! The delivery seam between the dispatcher and the outside world.

use crate::error::TransportError;
use async_trait::async_trait;
use veil_broker::BrokerDefinition;
use veil_core::UserData;

/// Delivers a rendered removal request to a broker.
///
/// Implementations decide success. The dispatcher wraps every call in a
/// timeout and retries transient errors, so a single call should make a
/// single attempt.
#[async_trait]
pub trait RemovalTransport: Send + Sync {
    /// Make one delivery attempt.
    async fn attempt_removal(
        &self,
        broker: &BrokerDefinition,
        user: &UserData,
        content: &str,
    ) -> Result<(), TransportError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
