//! Scan report types.

use serde::{Deserialize, Serialize};
use veil_core::Timestamp;

/// Where a breach was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureType {
    /// Publicly indexed breach corpus
    Surface,
    /// Dark-web or otherwise unindexed source
    Deep,
}

/// One breach the email address appears in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breach {
    /// Source-specific identifier
    pub id: String,
    /// Breached service name
    pub name: String,
    /// Breached service domain
    pub domain: String,
    /// When the breach happened (RFC 3339)
    pub breach_date: String,
    /// When the breach was catalogued (RFC 3339)
    pub added_date: String,
    /// Kinds of data exposed
    pub data_classes: Vec<String>,
    /// Free-text description
    pub description: String,
    /// Surface or deep web
    pub exposure_type: ExposureType,
    /// Whether the user has dealt with it
    pub is_resolved: bool,
}

/// A broker that holds data about the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerExposure {
    /// Broker ID, matching the broker registry
    pub id: String,
    /// Broker name
    pub name: String,
    /// Category display name
    pub category: String,
    /// Whether the broker has a record
    pub has_data: bool,
    /// Kinds of data held
    pub data_types: Vec<String>,
}

/// Which lookups a scan should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOptions {
    /// Include dark-web findings
    #[serde(default = "default_true")]
    pub include_dark_web: bool,
    /// Include broker exposure
    #[serde(default = "default_true")]
    pub include_data_brokers: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_dark_web: true,
            include_data_brokers: true,
        }
    }
}

/// Merged output of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Scan identifier (UUID v4)
    pub scan_id: String,
    /// Breach and dark-web findings
    pub breaches: Vec<Breach>,
    /// Broker exposure
    pub data_brokers: Vec<BrokerExposure>,
    /// When the scan ran
    pub scan_date: Timestamp,
}
