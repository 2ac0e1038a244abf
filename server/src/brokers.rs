//! Broker catalogue endpoints.

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use veil_broker::{BrokerCategory, BrokerSummary};

#[derive(Debug, Deserialize)]
pub struct BrokerQuery {
    pub category: Option<BrokerCategory>,
}

#[derive(Debug, Serialize)]
pub struct BrokerListResponse {
    pub count: usize,
    pub brokers: Vec<BrokerSummary>,
}

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub count: usize,
    pub templates: BTreeMap<String, TemplateView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateView {
    pub broker_id: String,
    pub broker_name: String,
    pub template: String,
}

/// `GET /brokers[?category=people-search]`
pub async fn list_brokers(
    State(state): State<AppState>,
    Query(query): Query<BrokerQuery>,
) -> Json<BrokerListResponse> {
    let brokers: Vec<BrokerSummary> = match query.category {
        Some(category) => state.registry.get_by_category(category),
        None => state.registry.get_all(),
    }
    .iter()
    .map(|b| b.summary())
    .collect();

    Json(BrokerListResponse {
        count: brokers.len(),
        brokers,
    })
}

/// `GET /templates`: request templates keyed by broker ID.
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplatesResponse> {
    let templates: BTreeMap<String, TemplateView> = state
        .registry
        .templates()
        .into_iter()
        .filter_map(|b| {
            let template = b.template()?.to_string();
            Some((
                b.id().to_string(),
                TemplateView {
                    broker_id: b.id().to_string(),
                    broker_name: b.name().to_string(),
                    template,
                },
            ))
        })
        .collect();

    Json(TemplatesResponse {
        count: templates.len(),
        templates,
    })
}
