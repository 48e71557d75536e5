use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::trash::dto::ItemSource;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub source: ItemSource,
    pub period: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub resolve: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationCount {
    pub location_name: String,
    pub type_counts: BTreeMap<String, usize>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrequencyBucket {
    pub label: String,
    pub time: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalyticsSummary {
    pub locations: Vec<LocationCount>,
    pub frequency: Vec<FrequencyBucket>,
    pub available_locations: Vec<String>,
    pub waste_types: Vec<String>,
    pub total_items: usize,
    pub filtered_items: usize,
    pub filter_summary: String,
}
