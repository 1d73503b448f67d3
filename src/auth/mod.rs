use crate::state::AppState;
use axum::Router;

pub mod claims;
mod dto;
pub mod handlers;
pub mod jwt;
pub mod middleware;
mod password;
pub mod repo;
pub mod repo_types;

pub use dto::MessageResponse;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
