use crate::state::AppState;
use axum::Router;

pub mod aggregate;
pub mod correlation;
pub mod dto;
pub mod geocode;
mod handlers;
pub mod locations;

pub fn router() -> Router<AppState> {
    handlers::read_routes()
}
