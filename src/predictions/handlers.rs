use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use super::{
    chart::{chart_for, PredictionChart},
    dto::{PredictionInput, PredictionResult},
    model_api::relay_error,
    services::{self, PredictError},
};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/api/Predictions", get(list_predictions))
        .route("/api/Predictions/:id", get(get_prediction))
        .route("/api/Predictions/:id/chart", get(prediction_chart))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/api/Predictions", post(make_prediction))
}

#[instrument(skip(state))]
pub async fn make_prediction(
    State(state): State<AppState>,
    Json(input): Json<PredictionInput>,
) -> Result<Json<PredictionResult>, (StatusCode, String)> {
    match services::predict(state.predictor.as_ref(), state.predictions.as_ref(), &input).await {
        Ok(result) => Ok(Json(result)),
        Err(PredictError::Duplicate) => Err((
            StatusCode::CONFLICT,
            "Deze voorspelling bestaat al in de database.".into(),
        )),
        Err(PredictError::Upstream(e)) => Err(relay_error(e)),
        Err(PredictError::Store(e)) => {
            error!(error = %e, "storing prediction failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Could not store prediction".into()))
        }
    }
}

#[instrument(skip(state))]
pub async fn list_predictions(
    State(state): State<AppState>,
) -> Result<Json<Vec<PredictionResult>>, (StatusCode, String)> {
    let results = state.predictions.list().await.map_err(|e| {
        error!(error = %e, "list predictions failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Could not load predictions".to_string())
    })?;
    Ok(Json(results))
}

#[instrument(skip(state))]
pub async fn get_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PredictionResult>, (StatusCode, String)> {
    load(&state, id).await.map(Json)
}

#[instrument(skip(state))]
pub async fn prediction_chart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PredictionChart>, (StatusCode, String)> {
    let result = load(&state, id).await?;
    Ok(Json(chart_for(&result)))
}

async fn load(state: &AppState, id: Uuid) -> Result<PredictionResult, (StatusCode, String)> {
    match state.predictions.get(id).await {
        Ok(Some(result)) => Ok(result),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Prediction not found".into())),
        Err(e) => {
            error!(error = %e, %id, "get prediction failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Could not load prediction".into()))
        }
    }
}
