use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, instrument, warn};

use super::{
    dto::{UpstreamFailure, WeatherData, WeatherRequest},
    services::{self, FetchError},
};
use crate::{auth::jwt::AuthUser, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/api/Weather", get(list_weather))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/api/Weather/fetch", post(fetch_weather))
        .route("/api/Weather/fetch-latest", post(fetch_latest_weather))
}

#[instrument(skip(state, _auth))]
pub async fn list_weather(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<WeatherData>>, (StatusCode, String)> {
    let records = state.weather.list_desc().await.map_err(|e| {
        error!(error = %e, "list weather failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Could not load weather data".to_string())
    })?;
    Ok(Json(records))
}

#[instrument(skip(state, _auth))]
pub async fn fetch_weather(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<WeatherRequest>,
) -> Result<Json<Vec<WeatherData>>, Response> {
    let saved = services::fetch_range(state.weather_api.as_ref(), state.weather.as_ref(), &req)
        .await
        .map_err(fetch_error)?;
    Ok(Json(saved))
}

#[instrument(skip(state, _auth))]
pub async fn fetch_latest_weather(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<WeatherData>, Response> {
    let record = services::fetch_latest(
        state.weather_api.as_ref(),
        state.weather.as_ref(),
        OffsetDateTime::now_utc(),
    )
    .await
    .map_err(fetch_error)?;
    Ok(Json(record))
}

fn fetch_error(err: FetchError) -> Response {
    match err {
        FetchError::Upstream { url, source } => {
            let status = source.status();
            warn!(%url, %status, error = %source, "weather api failed");
            let error = match source {
                crate::upstream::UpstreamError::Status { body, .. } => body,
                other => other.to_string(),
            };
            let body = UpstreamFailure {
                message: "Failed to fetch weather data",
                status: status.as_u16(),
                error,
                url,
            };
            (status, Json(body)).into_response()
        }
        FetchError::NoDaily => (
            StatusCode::BAD_REQUEST,
            "Geen dagelijkse data gevonden in de API-respons.",
        )
            .into_response(),
        FetchError::Store(e) => {
            error!(error = %e, "storing weather failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not store weather data").into_response()
        }
    }
}
