use crate::services::jobs::{handle_list_jobs, handle_update_job_status};
use crate::state::AppState;
use axum::{
    routing::{get, patch},
    Router,
};
use std::sync::Arc;

pub fn routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/jobs", get(handle_list_jobs))
        .route("/v1/jobs/{job_id}/status", patch(handle_update_job_status))
        .with_state(app_state)
}
