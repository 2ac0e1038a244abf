//! Veil Dispatch - Removal request dispatch.
//!
//! Turns a list of broker IDs and the user's details into one outcome per
//! broker:
//!
//! - **Dispatcher** ([`dispatcher`]): bounded concurrent fan-out, ordered results, cancellation
//! - **Retry** ([`retry`]): per-attempt timeout and backoff for transient failures
//! - **Transports** ([`transport`], [`simulated`], [`smtp`]): how a request leaves the process
//! - **Results** ([`result`]): per-broker outcomes and the aggregated batch
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use veil_broker::BrokerRegistry;
//! use veil_core::UserData;
//! use veil_dispatch::{Dispatcher, RemovalRequestBatch, SimulatedTransport};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(
//!     Arc::new(BrokerRegistry::with_defaults()),
//!     Arc::new(SimulatedTransport::default()),
//! );
//! let user = UserData::new("Jane", "Doe", "jane@example.com");
//! let results = dispatcher.dispatch(&["1".to_string(), "3".to_string()], &user).await?;
//! let batch = RemovalRequestBatch::aggregate(results);
//! println!("{} of {} accepted", batch.success_count, batch.broker_count);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod dispatcher;
pub mod error;
pub mod result;
pub mod retry;
pub mod simulated;
pub mod smtp;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Result, TransportError};
pub use result::{RemovalRequestBatch, RemovalResult};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use simulated::SimulatedTransport;
pub use smtp::SmtpTransport;
pub use transport::RemovalTransport;
