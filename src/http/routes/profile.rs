use crate::services::profiles::{handle_save_preferences, handle_save_profile};
use crate::state::AppState;
use axum::{routing::put, Router};
use std::sync::Arc;

pub fn routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/profile", put(handle_save_profile))
        .route("/v1/preferences", put(handle_save_preferences))
        .with_state(app_state)
}
