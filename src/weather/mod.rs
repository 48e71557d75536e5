use crate::state::AppState;
use axum::Router;

pub mod codes;
pub mod dto;
mod handlers;
pub mod open_meteo;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
