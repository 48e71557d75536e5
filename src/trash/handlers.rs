use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument};

use super::dto::{CreateTrashItem, ItemSource, SourceQuery, TrashItem};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/api/TrashItems/trash", get(list_trash_items))
        .route("/api/TrashItems/dummy", get(list_dummy_items))
        .route("/api/TrashItems/type/:litter_type", get(list_by_type))
        .route("/api/DummyTrashItems", get(list_dummy_items))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/api/TrashItems", post(create_trash_item))
        .route("/api/TrashItems/dummy", post(create_dummy_item))
}

#[instrument(skip(state))]
pub async fn list_trash_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrashItem>>, (StatusCode, String)> {
    list(&state, ItemSource::Real).await
}

#[instrument(skip(state))]
pub async fn list_dummy_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrashItem>>, (StatusCode, String)> {
    list(&state, ItemSource::Dummy).await
}

#[instrument(skip(state))]
pub async fn list_by_type(
    State(state): State<AppState>,
    Path(litter_type): Path<String>,
    Query(q): Query<SourceQuery>,
) -> Result<Json<Vec<TrashItem>>, (StatusCode, String)> {
    let items = state
        .trash
        .list_by_type(q.source, &litter_type)
        .await
        .map_err(|e| {
            error!(error = %e, %litter_type, "list_by_type failed");
            internal()
        })?;
    Ok(Json(items))
}

#[instrument(skip(state, body))]
pub async fn create_trash_item(
    State(state): State<AppState>,
    Json(body): Json<CreateTrashItem>,
) -> Result<(StatusCode, HeaderMap, Json<TrashItem>), (StatusCode, String)> {
    create(&state, ItemSource::Real, body).await
}

#[instrument(skip(state, body))]
pub async fn create_dummy_item(
    State(state): State<AppState>,
    Json(body): Json<CreateTrashItem>,
) -> Result<(StatusCode, HeaderMap, Json<TrashItem>), (StatusCode, String)> {
    create(&state, ItemSource::Dummy, body).await
}

async fn list(state: &AppState, source: ItemSource) -> Result<Json<Vec<TrashItem>>, (StatusCode, String)> {
    let items = state.trash.list(source).await.map_err(|e| {
        error!(error = %e, ?source, "list trash items failed");
        internal()
    })?;
    Ok(Json(items))
}

async fn create(
    state: &AppState,
    source: ItemSource,
    body: CreateTrashItem,
) -> Result<(StatusCode, HeaderMap, Json<TrashItem>), (StatusCode, String)> {
    let item = body.into_item(OffsetDateTime::now_utc());

    if let Err(e) = state.trash.insert(source, &item).await {
        // The store error stays in the log; callers only learn that it failed.
        error!(error = %e, ?source, id = %item.id, "insert trash item failed");
        let msg = match source {
            ItemSource::Real => "Error creating trash item",
            ItemSource::Dummy => "Error creating dummy trash item",
        };
        return Err((StatusCode::BAD_REQUEST, msg.into()));
    }

    info!(?source, id = %item.id, litter_type = %item.litter_type, "trash item created");

    let location = match source {
        ItemSource::Real => format!("/api/TrashItems/trash?id={}", item.id),
        ItemSource::Dummy => format!("/api/TrashItems/dummy?id={}", item.id),
    };
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&location) {
        headers.insert(header::LOCATION, value);
    }

    Ok((StatusCode::CREATED, headers, Json(item)))
}

fn internal() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "Could not load trash items".into())
}
