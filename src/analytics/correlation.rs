//! Weather-versus-litter correlation, computed by the FastAPI service.
//!
//! We only pick the items and the look-back window; the service fetches the
//! historical weather itself and answers with coefficients, Dutch insights and
//! chart series. The answer is relayed in the service's snake_case shape.

use axum::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::aggregate::Period;
use crate::{predictions::model_api::FastApiClient, trash::dto::TrashItem, upstream};

/// Breda city centre; the weather side of the analysis is taken here.
pub const BREDA_LATITUDE: f64 = 51.5912;
pub const BREDA_LONGITUDE: f64 = 4.7761;

const DEFAULT_DAYS_BACK: u32 = 31;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationItem {
    pub id: Uuid,
    pub litter_type: String,
    pub latitude: f32,
    pub longitude: f32,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<&TrashItem> for CorrelationItem {
    fn from(item: &TrashItem) -> Self {
        Self {
            id: item.id,
            litter_type: item.litter_type.clone(),
            latitude: item.latitude,
            longitude: item.longitude,
            timestamp: item.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRequest {
    pub trash_items: Vec<CorrelationItem>,
    pub latitude: f64,
    pub longitude: f64,
    pub days_back: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureData {
    pub labels: Vec<String>,
    pub temperature: Vec<f64>,
    pub trash_count: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherDistribution {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationScatter {
    pub temperature: Vec<f64>,
    pub trash_count: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationChart {
    pub temperature_data: TemperatureData,
    pub weather_distribution: WeatherDistribution,
    pub correlation_scatter: CorrelationScatter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationData {
    pub correlation_coefficient: f64,
    pub correlation_strength: String,
    pub sunny_weather_percentage: f64,
    pub rainy_weather_percentage: f64,
    pub temperature_correlation: f64,
    pub insights: Vec<String>,
    pub chart_data: CorrelationChart,
}

#[async_trait]
pub trait CorrelationApi: Send + Sync {
    async fn analyze(&self, req: &CorrelationRequest) -> upstream::Result<CorrelationData>;
}

#[async_trait]
impl CorrelationApi for FastApiClient {
    async fn analyze(&self, req: &CorrelationRequest) -> upstream::Result<CorrelationData> {
        self.post_json("/api/correlation/analyze", req).await
    }
}

/// Look-back window in days for the selected period. No period means a month.
pub fn days_back(period: Option<Period>) -> u32 {
    match period {
        Some(Period::Week) => 7,
        Some(Period::Month) => 31,
        Some(Period::Year) => 365,
        None => DEFAULT_DAYS_BACK,
    }
}

pub fn build_request<'a>(
    items: impl IntoIterator<Item = &'a TrashItem>,
    period: Option<Period>,
) -> CorrelationRequest {
    CorrelationRequest {
        trash_items: items.into_iter().map(CorrelationItem::from).collect(),
        latitude: BREDA_LATITUDE,
        longitude: BREDA_LONGITUDE,
        days_back: days_back(period),
    }
}
