use crate::services::search::{handle_run_status, handle_search};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/search", post(handle_search))
        .route("/v1/search/runs/{run_id}", get(handle_run_status))
        .with_state(app_state)
}
