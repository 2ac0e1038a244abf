//! Built-in broker definitions.
//!
//! Used when no definitions directory is configured. The same entries ship as
//! TOML under `broker-definitions/` so deployments can edit them.

use crate::definition::{
    BrokerCategory, BrokerDefinition, BrokerMetadata, RemovalDifficulty, RemovalMethod,
};
use veil_core::BrokerId;

struct Builtin {
    id: &'static str,
    name: &'static str,
    category: BrokerCategory,
    difficulty: RemovalDifficulty,
    estimated_days: u32,
    method: fn() -> RemovalMethod,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        id: "1",
        name: "Acxiom",
        category: BrokerCategory::DataBroker,
        difficulty: RemovalDifficulty::Medium,
        estimated_days: 45,
        method: || RemovalMethod::Email {
            email: "optout@acxiom.com".to_string(),
            template: "I request the removal of my personal information from your database \
                pursuant to CCPA/GDPR regulations. My information includes: \
                {name}, {email}, {address}, {phone}."
                .to_string(),
        },
    },
    Builtin {
        id: "2",
        name: "Experian",
        category: BrokerCategory::CreditBureau,
        difficulty: RemovalDifficulty::Hard,
        estimated_days: 30,
        method: || RemovalMethod::Form {
            url: "https://www.experian.com/privacy/opting-out".to_string(),
            template: None,
        },
    },
    Builtin {
        id: "3",
        name: "Spokeo",
        category: BrokerCategory::PeopleSearch,
        difficulty: RemovalDifficulty::Easy,
        estimated_days: 7,
        method: || RemovalMethod::Email {
            email: "privacy@spokeo.com".to_string(),
            template: "Please remove my information from your database. My information \
                includes: {name}, {email}, {address}. This is a formal opt-out request."
                .to_string(),
        },
    },
    Builtin {
        id: "4",
        name: "Whitepages",
        category: BrokerCategory::PeopleSearch,
        difficulty: RemovalDifficulty::Medium,
        estimated_days: 14,
        method: || RemovalMethod::Form {
            url: "https://www.whitepages.com/suppression-requests".to_string(),
            template: None,
        },
    },
    Builtin {
        id: "5",
        name: "Intelius",
        category: BrokerCategory::PeopleSearch,
        difficulty: RemovalDifficulty::Medium,
        estimated_days: 30,
        method: || RemovalMethod::Email {
            email: "privacy@intelius.com".to_string(),
            template: "I am requesting the removal of my personal information from your \
                database. My information includes: {name}, {email}, {address}, {phone}."
                .to_string(),
        },
    },
];

/// The default broker set, ordered by ID.
#[must_use]
pub fn default_brokers() -> Vec<BrokerDefinition> {
    BUILTINS
        .iter()
        .filter_map(|entry| {
            let id = BrokerId::new(entry.id).ok()?;
            Some(BrokerDefinition {
                broker: BrokerMetadata {
                    id,
                    name: entry.name.to_string(),
                    category: entry.category,
                    difficulty: entry.difficulty,
                    estimated_days: entry.estimated_days,
                },
                removal: (entry.method)(),
            })
        })
        .collect()
}
