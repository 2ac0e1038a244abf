//! Veil Scanner - Exposure scanning.
//!
//! A scan checks one email address against three kinds of source and merges
//! the findings into a [`ScanReport`]:
//!
//! - breach corpora ([`hibp::HibpClient`] or a static fixture),
//! - dark-web findings,
//! - data broker exposure.
//!
//! Sources sit behind the [`BreachSource`] and [`BrokerExposureSource`]
//! traits; [`ScanService`] queries them concurrently.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod fixtures;
pub mod hibp;
pub mod service;
pub mod source;
pub mod types;

pub use error::{Result, ScanError};
pub use hibp::HibpClient;
pub use service::ScanService;
pub use source::{BreachSource, BrokerExposureSource};
pub use types::{Breach, BrokerExposure, ExposureType, ScanOptions, ScanReport};
