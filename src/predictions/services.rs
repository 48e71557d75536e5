use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CategoryPrediction, ModelRequest, ModelResponse, PredictionInput, PredictionResult},
    model_api::PredictionApi,
    repo::PredictionStore,
};
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("a matching prediction is already stored")]
    Duplicate,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Mean of the category confidences, 0 when there are none.
pub fn average_confidence(categories: &[CategoryPrediction]) -> f32 {
    if categories.is_empty() {
        return 0.0;
    }
    categories.iter().map(|c| c.confidence_score).sum::<f32>() / categories.len() as f32
}

pub fn build_result(input: &PredictionInput, resp: ModelResponse) -> PredictionResult {
    let id = Uuid::new_v4();
    let confidences = resp.confidence_scores.unwrap_or_default();
    let models = resp.model_used_per_category.unwrap_or_default();

    let predictions: Vec<CategoryPrediction> = resp
        .predictions
        .into_iter()
        .map(|(category, predicted_value)| CategoryPrediction {
            id: Uuid::new_v4(),
            prediction_result_id: id,
            confidence_score: confidences.get(&category).copied().unwrap_or(0.0),
            model_used: models
                .get(&category)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            category,
            predicted_value,
        })
        .collect();

    PredictionResult {
        id,
        timestamp: input.datum,
        latitude: resp.latitude,
        longitude: resp.longitude,
        weather: input.weersverwachting.clone(),
        temp: input.temperatuur,
        avg_confidence: average_confidence(&predictions),
        predictions,
    }
}

/// Asks the model for a prediction unless an equivalent one is stored, and
/// stores the answer.
pub async fn predict(
    api: &dyn PredictionApi,
    store: &dyn PredictionStore,
    input: &PredictionInput,
) -> Result<PredictionResult, PredictError> {
    let date = input.datum.date();
    if store
        .exists_similar(date, &input.weersverwachting, input.temperatuur)
        .await?
    {
        warn!(%date, weather = %input.weersverwachting, "prediction already stored");
        return Err(PredictError::Duplicate);
    }

    let resp = api.predict(&ModelRequest::from(input)).await?;
    let result = build_result(input, resp);
    store.save(&result).await?;

    info!(
        id = %result.id,
        categories = result.predictions.len(),
        avg_confidence = result.avg_confidence,
        "prediction stored"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePredictionApi, MemoryPredictionStore};
    use axum::http::StatusCode;
    use std::collections::BTreeMap;
    use time::macros::datetime;

    fn input(temp: f32) -> PredictionInput {
        PredictionInput {
            datum: datetime!(2025-06-12 09:00 UTC),
            temperatuur: temp,
            weersverwachting: "Regen".into(),
        }
    }

    fn answer() -> ModelResponse {
        ModelResponse {
            predictions: BTreeMap::from([("Plastic".into(), 12), ("Glass".into(), 3)]),
            confidence_scores: Some(BTreeMap::from([("Plastic".into(), 0.8)])),
            model_used_per_category: None,
            latitude: 51.589,
            longitude: 4.776,
        }
    }

    #[test]
    fn missing_confidence_and_model_get_defaults() {
        let result = build_result(&input(18.0), answer());
        let glass = result
            .predictions
            .iter()
            .find(|c| c.category == "Glass")
            .unwrap();
        assert_eq!(glass.confidence_score, 0.0);
        assert_eq!(glass.model_used, "unknown");
        assert_eq!(glass.prediction_result_id, result.id);
        assert!((result.avg_confidence - 0.4).abs() < 1e-6);
        assert_eq!(result.latitude, 51.589);
        assert_eq!(result.weather, "Regen");
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average_confidence(&[]), 0.0);
    }

    #[tokio::test]
    async fn stores_once_then_conflicts() {
        let api = FakePredictionApi::answering(answer());
        let store = MemoryPredictionStore::default();

        let first = predict(&api, &store, &input(18.0)).await.unwrap();
        assert_eq!(first.predictions.len(), 2);
        assert_eq!(api.calls(), 1);

        let again = predict(&api, &store, &input(18.005)).await.unwrap_err();
        assert!(matches!(again, PredictError::Duplicate));
        assert_eq!(api.calls(), 1);

        predict(&api, &store, &input(18.5)).await.unwrap();
        assert_eq!(api.calls(), 2);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn model_failure_stores_nothing() {
        let api = FakePredictionApi::failing(StatusCode::INTERNAL_SERVER_ERROR, "model offline");
        let store = MemoryPredictionStore::default();

        match predict(&api, &store, &input(18.0)).await.unwrap_err() {
            PredictError::Upstream(UpstreamError::Status { status, body }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "model offline");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(store.list().await.unwrap().is_empty());
    }
}
