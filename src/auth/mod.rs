use crate::state::AppState;
use axum::Router;

mod claims;
pub mod cookie;
mod dto;
pub mod gate;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use gate::{require_session, CurrentUser};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
