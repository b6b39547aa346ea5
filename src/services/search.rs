use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::db;
use crate::events::publisher::publish_app_event;
use crate::models::events::{EventType, SearchRequested};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub user_id: Uuid,
}

type HandlerError = (StatusCode, Json<Value>);

fn internal_error(context: &str, e: impl std::fmt::Debug) -> HandlerError {
    error!("❌ {}: {:?}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": context })),
    )
}

/// Queues a search run for the user. The pipeline itself never runs on the
/// request path; the event worker picks the trigger up.
pub async fn handle_search(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<(StatusCode, Json<Value>), HandlerError> {
    let throttle_key = format!("search:throttle:{}", req.user_id);
    let ttl = app_state.config.cache.search_throttle_secs;

    let mut conn = app_state
        .redis_pool
        .get()
        .await
        .map_err(|e| internal_error("Failed to reach Redis", e))?;

    // SET NX both checks and arms the throttle in one round trip.
    let acquired: Option<String> = redis::cmd("SET")
        .arg(&throttle_key)
        .arg("1")
        .arg("NX")
        .arg("EX")
        .arg(ttl)
        .query_async(&mut conn)
        .await
        .map_err(|e| internal_error("Failed to apply search throttle", e))?;

    if acquired.is_none() {
        info!("🛑 Search throttled for user {}", req.user_id);
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Too many requests",
                "message": format!(
                    "A search was requested recently. Try again in up to {} seconds.",
                    ttl
                )
            })),
        ));
    }

    let payload = serde_json::to_value(SearchRequested {
        user_id: req.user_id,
    })
    .map_err(|e| internal_error("Failed to encode search trigger", e))?;

    publish_app_event(&app_state, EventType::JobsSearchRequested, payload)
        .await
        .map_err(|e| internal_error("Failed to queue search", e))?;

    info!("📬 Queued search run for user {}", req.user_id);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "queued",
            "user_id": req.user_id
        })),
    ))
}

/// Reads the lifecycle of one search run: its status, the last completed
/// step and any message or error it finished with.
pub async fn handle_run_status(
    State(app_state): State<Arc<AppState>>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<Value>, HandlerError> {
    let run = db::runs::fetch_run(&app_state.db_pool, run_id)
        .await
        .map_err(|e| internal_error("Failed to load search run", e))?;

    let Some(run) = run else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Search run not found" })),
        ));
    };

    Ok(Json(json!({
        "id": run.id,
        "user_id": run.user_id,
        "status": run.status,
        "last_step": run.last_step,
        "message": run.message,
        "error": run.error,
        "started_at": run.started_at,
        "updated_at": run.updated_at,
    })))
}
