//! Have I Been Pwned breach lookup.

use crate::error::{Result, ScanError};
use crate::source::BreachSource;
use crate::types::{Breach, ExposureType};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use veil_core::ScanningConfig;

const PROVIDER: &str = "hibp";

/// Client for the HIBP v3 `breachedaccount` endpoint.
pub struct HibpClient {
    client: Client,
    base_url: String,
    api_key: String,
    user_agent: String,
}

impl HibpClient {
    /// Create a client against `base_url` (e.g. `https://haveibeenpwned.com/api/v3`).
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScanError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            user_agent: user_agent.into(),
        })
    }

    /// Build from the scanning configuration. Returns `Ok(None)` when no API
    /// key is configured.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(config: &ScanningConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.hibp_api_key.as_deref().filter(|k| !k.trim().is_empty())
        else {
            return Ok(None);
        };

        Self::new(
            config.hibp_api_url.as_str(),
            api_key,
            config.user_agent.as_str(),
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }
}

#[async_trait]
impl BreachSource for HibpClient {
    async fn breaches(&self, email: &str) -> Result<Vec<Breach>> {
        let url = format!(
            "{}/breachedaccount/{}",
            self.base_url,
            urlencoding::encode(email)
        );

        let response = self
            .client
            .get(url)
            .query(&[("truncateResponse", "false")])
            .header("hibp-api-key", &self.api_key)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => return Ok(Vec::new()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ScanError::AuthenticationFailed {
                    provider: PROVIDER.to_string(),
                });
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                return Err(ScanError::RateLimited {
                    provider: PROVIDER.to_string(),
                    retry_after_secs,
                });
            }
            _ if !status.is_success() => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(ScanError::Api {
                    provider: PROVIDER.to_string(),
                    status: status.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let breaches: Vec<HibpBreach> = response.json().await.map_err(|e| ScanError::Parse {
            provider: PROVIDER.to_string(),
            message: format!("Failed to parse response: {e}"),
        })?;

        tracing::debug!(count = breaches.len(), "hibp lookup complete");

        Ok(breaches.into_iter().map(Breach::from).collect())
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

// HIBP API types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HibpBreach {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    domain: String,
    breach_date: String,
    added_date: String,
    #[serde(default)]
    data_classes: Vec<String>,
    #[serde(default)]
    description: String,
}

impl From<HibpBreach> for Breach {
    fn from(breach: HibpBreach) -> Self {
        Self {
            name: breach.title.unwrap_or_else(|| breach.name.clone()),
            id: breach.name,
            domain: breach.domain,
            breach_date: normalize_date(&breach.breach_date),
            added_date: normalize_date(&breach.added_date),
            data_classes: breach.data_classes,
            description: breach.description,
            exposure_type: ExposureType::Surface,
            is_resolved: false,
        }
    }
}

/// HIBP reports breach dates as bare `YYYY-MM-DD`; widen them to RFC 3339.
fn normalize_date(date: &str) -> String {
    if date.len() == 10 && !date.contains('T') {
        format!("{date}T00:00:00Z")
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2021-06-22"), "2021-06-22T00:00:00Z");
        assert_eq!(normalize_date("2021-06-29T08:12:00Z"), "2021-06-29T08:12:00Z");
    }

    #[test]
    fn test_from_config_without_key() {
        let config = ScanningConfig::default();
        assert!(HibpClient::from_config(&config)
            .expect("build client")
            .is_none());
    }

    #[test]
    fn test_breach_conversion_prefers_title() {
        let raw: HibpBreach = serde_json::from_str(
            r#"{
                "Name": "Adobe",
                "Title": "Adobe Systems",
                "Domain": "adobe.com",
                "BreachDate": "2013-10-04",
                "AddedDate": "2013-12-04T00:00:00Z",
                "DataClasses": ["Email addresses", "Passwords"],
                "Description": "Adobe breach"
            }"#,
        )
        .expect("parse breach");

        let breach = Breach::from(raw);
        assert_eq!(breach.id, "Adobe");
        assert_eq!(breach.name, "Adobe Systems");
        assert_eq!(breach.breach_date, "2013-10-04T00:00:00Z");
        assert_eq!(breach.exposure_type, ExposureType::Surface);
    }
}
