use std::{collections::HashSet, time::Duration};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument};

use super::{
    aggregate::{self, Filters},
    correlation::{self, CorrelationData},
    dto::{AnalyticsSummary, SummaryQuery},
    geocode,
    locations::location_key,
};
use crate::{
    predictions::model_api::relay_error,
    state::AppState,
    trash::dto::{ItemSource, TrashItem},
};

/// Pause between reverse-geocoding lookups.
const LOOKUP_PAUSE: Duration = Duration::from_millis(200);

/// Fresh reverse-geocoding lookups per request. Remaining points show their
/// fallback name until a later request resolves them.
const MAX_LOOKUPS_PER_REQUEST: usize = 20;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/api/Analytics/summary", get(summary))
        .route("/api/Analytics/correlation", get(correlation))
}

/// Loads the items for the query's source. With `resolve` on real data, up to
/// `MAX_LOOKUPS_PER_REQUEST` new points are reverse-geocoded first, which costs
/// roughly a second per five new points.
async fn load_items(state: &AppState, q: &SummaryQuery) -> Result<Vec<TrashItem>, (StatusCode, String)> {
    let items = state.trash.list(q.source).await.map_err(|e| {
        error!(error = %e, source = ?q.source, "loading items for analytics failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Could not load trash items".to_string())
    })?;

    if q.resolve && q.source == ItemSource::Real {
        let mut seen = HashSet::new();
        let points: Vec<(f32, f32)> = items
            .iter()
            .map(|i| (i.latitude, i.longitude))
            .filter(|(lat, lon)| seen.insert(location_key(*lat, *lon)))
            .collect();
        let looked_up = geocode::preload(
            state.geocoder.as_ref(),
            &state.locations,
            &points,
            LOOKUP_PAUSE,
            MAX_LOOKUPS_PER_REQUEST,
        )
        .await;
        info!(points = points.len(), looked_up, "location names resolved");
    }

    Ok(items)
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<AnalyticsSummary>, (StatusCode, String)> {
    let items = load_items(&state, &q).await?;
    let filters = Filters::from_query(&q);
    let summary = aggregate::summarize(&items, &filters, OffsetDateTime::now_utc(), |item| {
        state
            .locations
            .name_for(q.source, item.latitude, item.longitude)
    });
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn correlation(
    State(state): State<AppState>,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<CorrelationData>, (StatusCode, String)> {
    let items = load_items(&state, &q).await?;
    let filters = Filters::from_query(&q);
    let kept = aggregate::filtered(&items, &filters, OffsetDateTime::now_utc(), |item| {
        state
            .locations
            .name_for(q.source, item.latitude, item.longitude)
    });

    let request = correlation::build_request(kept, filters.period);
    info!(items = request.trash_items.len(), days_back = request.days_back, "requesting correlation");
    let data = state.correlation.analyze(&request).await.map_err(relay_error)?;
    Ok(Json(data))
}
