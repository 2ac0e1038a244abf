//! Veil Broker - Broker registry for removal request dispatch.
//!
//! This crate provides the reference data the dispatcher works from: which
//! brokers exist, how each one accepts removal requests, and the message
//! template to send them. Definitions come from built-in defaults or a
//! directory of TOML files and are never mutated by request handling.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Strongly-typed broker metadata and removal method
//! - **Loader** ([`loader`]): TOML file loading from `broker-definitions/` directory
//! - **Registry** ([`registry`]): In-memory cache with query support
//! - **Directory** ([`directory`]): The lookup seam the dispatcher depends on
//! - **Templates** ([`template`]): Placeholder substitution for request content
//! - **Errors** ([`error`]): Broker-specific error types
//!
//! # Example
//!
//! ```rust
//! use veil_broker::{render_template, BrokerDirectory, BrokerRegistry};
//! use veil_core::{BrokerId, UserData};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = BrokerRegistry::with_defaults();
//! let broker = registry.lookup(&BrokerId::new("3")?).expect("spokeo is built in");
//!
//! let user = UserData::new("Jane", "Doe", "jane@example.com");
//! let content = render_template(broker.template().unwrap_or_default(), &user);
//! assert!(content.contains("Jane Doe"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod builtin;
pub mod definition;
pub mod directory;
pub mod error;
pub mod loader;
pub mod registry;
pub mod template;

// Re-export commonly used types
pub use definition::{
    BrokerCategory, BrokerDefinition, BrokerMetadata, BrokerSummary, RemovalDifficulty,
    RemovalMethod, RemovalProcess,
};
pub use directory::BrokerDirectory;
pub use error::{BrokerError, Result};
pub use loader::BrokerLoader;
pub use registry::BrokerRegistry;
pub use template::render_template;
