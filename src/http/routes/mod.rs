use crate::middleware::api_key::api_key_auth;
use crate::state::AppState;
use axum::{middleware, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub mod job;
pub mod profile;
pub mod search;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339(),
    };

    Json(response)
}

pub fn create_routes(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .merge(search::routes(app_state.clone()))
        .merge(job::routes(app_state.clone()))
        .merge(profile::routes(app_state.clone()))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            api_key_auth,
        ));

    Router::new()
        .route("/", get(health_check))
        .nest("/api", api)
        .layer(cors)
}
