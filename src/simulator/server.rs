use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::Simulator;
use crate::trash::dto::TrashItem;

const DEFAULT_COUNT: usize = 5;
const MAX_COUNT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Generated {
    pub message: String,
    pub items: Vec<TrashItem>,
}

pub fn router(sim: Arc<Simulator>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate", post(generate))
        .with_state(sim)
}

async fn health(State(sim): State<Arc<Simulator>>) -> Json<Health> {
    Json(Health {
        status: "OK".into(),
        message: format!("Simulator is running and posting to {}", sim.target()),
    })
}

#[instrument(skip(sim))]
async fn generate(
    State(sim): State<Arc<Simulator>>,
    body: Option<Json<GenerateRequest>>,
) -> Json<Generated> {
    let count = body
        .and_then(|Json(b)| b.count)
        .unwrap_or(DEFAULT_COUNT)
        .min(MAX_COUNT);
    info!(count, "manual generation requested");

    let items = sim.post_batch(count).await;
    Json(Generated {
        message: format!("Generated {} new items and posted to database", items.len()),
        items,
    })
}
