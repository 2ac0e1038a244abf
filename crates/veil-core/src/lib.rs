//! Veil Core - Foundation crate for the Veil removal service.
//!
//! This crate provides shared types, error handling and configuration
//! management that all other Veil crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared newtypes (`BrokerId`, `RequestId`, `Timestamp`)
//! - [`status`] - The removal status state machine
//! - [`user`] - Per-request personal data supplied by the caller
//!
//! # Example
//!
//! ```rust
//! use veil_core::{AppConfig, RemovalStatus};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.dispatch.max_concurrent, 4);
//! assert!(RemovalStatus::Pending.can_transition_to(RemovalStatus::InProgress));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod status;
pub mod types;
pub mod user;

// Re-export commonly used types
pub use config::{
    AppConfig, BrokerSourceConfig, DatabaseConfig, DispatchConfig, ScanningConfig, ServerConfig,
    SmtpSettings, TransportKind,
};
pub use error::{ConfigError, ConfigResult, Result, VeilError};
pub use status::{BatchStatus, RemovalStatus};
pub use types::{BrokerId, RequestId, Timestamp};
pub use user::UserData;
