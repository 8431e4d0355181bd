use crate::state::AppState;
use axum::Router;

pub mod client;
pub mod dto;
pub mod handlers;
pub mod history;

pub fn router() -> Router<AppState> {
    handlers::rating_routes()
}
