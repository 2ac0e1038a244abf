//! Lookup sources a scan draws from.

use crate::error::Result;
use crate::types::{Breach, BrokerExposure};
use async_trait::async_trait;

/// A source of breach records for an email address.
#[async_trait]
pub trait BreachSource: Send + Sync {
    /// Breaches containing `email`. No breaches is `Ok(vec![])`.
    async fn breaches(&self, email: &str) -> Result<Vec<Breach>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// A source of broker exposure for an email address.
#[async_trait]
pub trait BrokerExposureSource: Send + Sync {
    /// Brokers known to hold data about `email`.
    async fn exposures(&self, email: &str) -> Result<Vec<BrokerExposure>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
