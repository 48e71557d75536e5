use crate::state::AppState;
use axum::Router;

pub mod chart;
pub mod dto;
mod handlers;
pub mod model_api;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
