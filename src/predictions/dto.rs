use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::datetime::format_date;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PredictionInput {
    #[serde(alias = "datum", deserialize_with = "crate::datetime::lenient::deserialize")]
    pub datum: OffsetDateTime,
    #[serde(alias = "temperatuur")]
    pub temperatuur: f32,
    #[serde(alias = "weersverwachting")]
    pub weersverwachting: String,
}

/// Body posted to the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub datum: String,
    pub temperatuur: f32,
    pub weersverwachting: String,
}

impl From<&PredictionInput> for ModelRequest {
    fn from(input: &PredictionInput) -> Self {
        Self {
            datum: format_date(input.datum.date()),
            temperatuur: input.temperatuur,
            weersverwachting: input.weersverwachting.clone(),
        }
    }
}

/// Answer of the prediction service. Every map is keyed by category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelResponse {
    #[serde(default)]
    pub predictions: BTreeMap<String, i32>,
    #[serde(default)]
    pub confidence_scores: Option<BTreeMap<String, f32>>,
    #[serde(default)]
    pub model_used_per_category: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub latitude: f32,
    #[serde(default)]
    pub longitude: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct PredictionResult {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub latitude: f32,
    pub longitude: f32,
    pub weather: String,
    pub temp: f32,
    pub avg_confidence: f32,
    #[sqlx(skip)]
    #[serde(default)]
    pub predictions: Vec<CategoryPrediction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryPrediction {
    pub id: Uuid,
    #[serde(skip)]
    pub prediction_result_id: Uuid,
    pub category: String,
    pub predicted_value: i32,
    pub confidence_score: f32,
    pub model_used: String,
}
