//! Read-only broker lookup used by the dispatcher.
//!
//! Dispatch only needs to resolve IDs, so it depends on this trait rather than
//! on [`BrokerRegistry`](crate::BrokerRegistry). A persistent store or a test
//! double can stand in without touching dispatch code.

use crate::definition::BrokerDefinition;
use veil_core::BrokerId;

/// Source of broker definitions.
pub trait BrokerDirectory: Send + Sync {
    /// Resolve a broker ID. Returns `None` for unknown brokers.
    ///
    /// Must be pure: repeated calls with the same ID return equal data.
    fn lookup(&self, broker_id: &BrokerId) -> Option<BrokerDefinition>;

    /// All known brokers, ordered by ID.
    fn list(&self) -> Vec<BrokerDefinition>;
}
