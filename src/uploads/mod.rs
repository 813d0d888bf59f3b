mod dto;
pub mod gatekeeper;
pub mod handlers;
mod services;

pub use gatekeeper::UploadGatekeeper;
pub use services::PUBLIC_PREFIX;

use crate::state::AppState;
use axum::Router;

pub fn router(max_bytes: usize) -> Router<AppState> {
    Router::new().merge(handlers::upload_routes(max_bytes))
}
