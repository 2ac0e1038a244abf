//! Broker definition types and structures.
//!
//! This module defines the data structures for broker definitions loaded from
//! TOML files or the built-in defaults.

use crate::error::{BrokerError, Result};
use serde::{Deserialize, Serialize};
use veil_core::BrokerId;

/// Complete broker definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerDefinition {
    /// Core broker metadata
    pub broker: BrokerMetadata,

    /// Removal/opt-out configuration
    pub removal: RemovalMethod,
}

impl BrokerDefinition {
    /// Get the broker ID.
    #[must_use]
    pub fn id(&self) -> &BrokerId {
        &self.broker.id
    }

    /// Get the broker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.broker.name
    }

    /// Get the broker category.
    #[must_use]
    pub fn category(&self) -> BrokerCategory {
        self.broker.category
    }

    /// How this broker accepts removal requests.
    #[must_use]
    pub fn removal_process(&self) -> RemovalProcess {
        self.removal.process()
    }

    /// Email address or URL that removal requests are sent to.
    #[must_use]
    pub fn contact_target(&self) -> &str {
        self.removal.contact_target()
    }

    /// Request template, if the broker accepts a written request.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.removal.template()
    }

    /// Validate the broker definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        if self.broker.name.trim().is_empty() {
            return Err(BrokerError::ValidationError {
                broker_id: self.broker.id.to_string(),
                reason: "broker name cannot be empty".to_string(),
            });
        }

        if self.broker.estimated_days == 0 || self.broker.estimated_days > 365 {
            return Err(BrokerError::ValidationError {
                broker_id: self.broker.id.to_string(),
                reason: format!(
                    "estimated_days must be 1-365, got {}",
                    self.broker.estimated_days
                ),
            });
        }

        self.removal.validate(&self.broker.id)
    }

    /// Wire-facing summary of this definition.
    #[must_use]
    pub fn summary(&self) -> BrokerSummary {
        BrokerSummary {
            id: self.broker.id.clone(),
            name: self.broker.name.clone(),
            category: self.broker.category.display_name().to_string(),
            removal_process: self.removal_process(),
            contact_target: self.contact_target().to_string(),
            template: self.template().map(ToString::to_string),
            difficulty: self.broker.difficulty,
            estimated_days: self.broker.estimated_days,
        }
    }
}

/// Core broker metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerMetadata {
    /// Unique broker identifier (e.g., "1", "spokeo")
    pub id: BrokerId,

    /// Human-readable broker name
    pub name: String,

    /// Broker category
    pub category: BrokerCategory,

    /// Difficulty level for removal
    #[serde(default = "default_difficulty")]
    pub difficulty: RemovalDifficulty,

    /// Typical number of days for removal to complete
    #[serde(default = "default_estimated_days")]
    pub estimated_days: u32,
}

fn default_difficulty() -> RemovalDifficulty {
    RemovalDifficulty::Medium
}

fn default_estimated_days() -> u32 {
    30
}

/// Categories of data brokers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrokerCategory {
    /// Data aggregators and marketing data brokers (Acxiom, etc.)
    DataBroker,
    /// Credit bureaus (Experian, etc.)
    CreditBureau,
    /// People search engines (Spokeo, Whitepages, etc.)
    PeopleSearch,
    /// Background check services
    BackgroundCheck,
    /// Other/uncategorized
    Other,
}

impl BrokerCategory {
    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DataBroker => "Data Broker",
            Self::CreditBureau => "Credit Bureau",
            Self::PeopleSearch => "People Search",
            Self::BackgroundCheck => "Background Check",
            Self::Other => "Other",
        }
    }
}

/// Difficulty level for removal from a broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RemovalDifficulty {
    /// Simple request, quick response
    Easy,
    /// Requires verification or multiple steps
    Medium,
    /// Requires manual intervention or follow-up
    Hard,
}

/// The kind of channel a broker accepts removal requests through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalProcess {
    /// Written request sent by email
    Email,
    /// Web form the user (or an automation) fills in
    Form,
    /// Programmatic opt-out endpoint
    Api,
}

/// Methods for removal/opt-out from a broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "process", rename_all = "kebab-case")]
pub enum RemovalMethod {
    /// Email-based removal
    Email {
        /// Email address for removal requests
        email: String,
        /// Email body template with `{name}`, `{email}`, `{phone}`, `{address}`
        template: String,
    },

    /// Web form submission
    Form {
        /// URL of the opt-out form
        url: String,
        /// Optional written request to accompany the form
        #[serde(default)]
        template: Option<String>,
    },

    /// API-based removal
    Api {
        /// Opt-out endpoint
        url: String,
        /// Optional request body template
        #[serde(default)]
        template: Option<String>,
    },
}

impl RemovalMethod {
    /// The channel kind for this method.
    #[must_use]
    pub fn process(&self) -> RemovalProcess {
        match self {
            Self::Email { .. } => RemovalProcess::Email,
            Self::Form { .. } => RemovalProcess::Form,
            Self::Api { .. } => RemovalProcess::Api,
        }
    }

    /// Email address or URL requests are sent to.
    #[must_use]
    pub fn contact_target(&self) -> &str {
        match self {
            Self::Email { email, .. } => email.as_str(),
            Self::Form { url, .. } | Self::Api { url, .. } => url.as_str(),
        }
    }

    /// Request template, if any.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        match self {
            Self::Email { template, .. } => Some(template.as_str()),
            Self::Form { template, .. } | Self::Api { template, .. } => template.as_deref(),
        }
    }

    /// Validate the removal method configuration.
    fn validate(&self, broker_id: &BrokerId) -> Result<()> {
        match self {
            Self::Email { email, template } => {
                if !email.contains('@') {
                    return Err(BrokerError::ValidationError {
                        broker_id: broker_id.to_string(),
                        reason: format!("email removal requires an email address, got '{email}'"),
                    });
                }
                if template.trim().is_empty() {
                    return Err(BrokerError::ValidationError {
                        broker_id: broker_id.to_string(),
                        reason: "email removal requires a template".to_string(),
                    });
                }
            }
            Self::Form { url, .. } | Self::Api { url, .. } => {
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(BrokerError::ValidationError {
                        broker_id: broker_id.to_string(),
                        reason: format!(
                            "{} removal requires an http(s) URL, got '{url}'",
                            self.process_name()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn process_name(&self) -> &'static str {
        match self.process() {
            RemovalProcess::Email => "email",
            RemovalProcess::Form => "form",
            RemovalProcess::Api => "api",
        }
    }
}

/// Flattened broker view returned by listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerSummary {
    /// Broker ID
    pub id: BrokerId,
    /// Display name
    pub name: String,
    /// Category display name
    pub category: String,
    /// Channel kind
    pub removal_process: RemovalProcess,
    /// Email address or URL
    pub contact_target: String,
    /// Request template, if any
    pub template: Option<String>,
    /// Removal difficulty
    pub difficulty: RemovalDifficulty,
    /// Typical days until removal completes
    pub estimated_days: u32,
}
