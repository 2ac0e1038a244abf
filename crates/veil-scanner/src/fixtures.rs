//! Static sources used when no live provider is configured.
//!
//! They return the same findings for every address, which keeps the scan
//! endpoint usable in development and demos.

use crate::error::Result;
use crate::source::{BreachSource, BrokerExposureSource};
use crate::types::{Breach, BrokerExposure, ExposureType};
use async_trait::async_trait;

fn breach(
    id: &str,
    name: &str,
    domain: &str,
    dates: (&str, &str),
    data_classes: &[&str],
    description: &str,
    exposure_type: ExposureType,
) -> Breach {
    Breach {
        id: id.to_string(),
        name: name.to_string(),
        domain: domain.to_string(),
        breach_date: dates.0.to_string(),
        added_date: dates.1.to_string(),
        data_classes: data_classes.iter().map(ToString::to_string).collect(),
        description: description.to_string(),
        exposure_type,
        is_resolved: false,
    }
}

fn exposure(id: &str, name: &str, category: &str, data_types: &[&str]) -> BrokerExposure {
    BrokerExposure {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        has_data: true,
        data_types: data_types.iter().map(ToString::to_string).collect(),
    }
}

/// Fixed breach findings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBreachSource;

#[async_trait]
impl BreachSource for StaticBreachSource {
    async fn breaches(&self, _email: &str) -> Result<Vec<Breach>> {
        Ok(vec![
            breach(
                "1",
                "LinkedIn",
                "linkedin.com",
                ("2021-06-22T00:00:00Z", "2021-06-29T00:00:00Z"),
                &[
                    "Email addresses",
                    "Passwords",
                    "Phone numbers",
                    "Job titles",
                    "Social media profiles",
                ],
                "In June 2021, LinkedIn experienced a data breach that exposed the data of \
                 700 million users, approximately 92% of the total LinkedIn user base at that \
                 time. The exposed data included email addresses, phone numbers, geolocation \
                 records, genders, and other social media details.",
                ExposureType::Surface,
            ),
            breach(
                "2",
                "Adobe",
                "adobe.com",
                ("2020-10-15T00:00:00Z", "2020-10-20T00:00:00Z"),
                &["Email addresses", "Passwords", "Credit cards", "Subscription details"],
                "In October 2020, Adobe suffered a security breach that exposed customer \
                 information including email addresses and encrypted password credentials, as \
                 well as credit card information for a subset of customers.",
                ExposureType::Deep,
            ),
        ])
    }

    fn name(&self) -> &'static str {
        "static-breaches"
    }
}

/// Fixed dark-web findings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDarkWebSource;

#[async_trait]
impl BreachSource for StaticDarkWebSource {
    async fn breaches(&self, _email: &str) -> Result<Vec<Breach>> {
        Ok(vec![breach(
            "3",
            "Dark Web Marketplace",
            "darkwebmarket.onion",
            ("2022-03-10T00:00:00Z", "2022-03-15T00:00:00Z"),
            &["Email addresses", "Passwords", "Credit cards"],
            "Your information was found in a dark web marketplace known for selling stolen \
             credentials and financial information.",
            ExposureType::Deep,
        )])
    }

    fn name(&self) -> &'static str {
        "static-dark-web"
    }
}

/// Fixed broker exposure findings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBrokerExposureSource;

#[async_trait]
impl BrokerExposureSource for StaticBrokerExposureSource {
    async fn exposures(&self, _email: &str) -> Result<Vec<BrokerExposure>> {
        Ok(vec![
            exposure(
                "1",
                "Acxiom",
                "Data Broker",
                &["Name", "Address", "Phone number", "Email"],
            ),
            exposure(
                "2",
                "Experian",
                "Credit Bureau",
                &["Credit history", "Financial data", "Address history"],
            ),
            exposure(
                "5",
                "Intelius",
                "People Search",
                &["Name", "Address", "Phone number", "Relatives"],
            ),
        ])
    }

    fn name(&self) -> &'static str {
        "static-brokers"
    }
}
