pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::extract;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes/extract", post(extract::handle_extract))
        .with_state(state)
}
