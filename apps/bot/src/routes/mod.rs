pub mod health;
pub mod webhook;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/webhook/:token", post(webhook::handle_update))
        .with_state(state)
}
