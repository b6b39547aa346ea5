use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::db;
use crate::models::preferences::UserJobStatus;
use crate::state::AppState;

type HandlerError = (StatusCode, Json<Value>);

fn internal_error(context: &str, e: impl std::fmt::Debug) -> HandlerError {
    error!("❌ {}: {:?}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": context })),
    )
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub user_id: Uuid,
}

/// Matched jobs for a user, best score first. Joins the canonical posting
/// with the per-user association so the card and the match data arrive
/// together.
pub async fn handle_list_jobs(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Value>, HandlerError> {
    let rows = db::user_jobs::list_matches_for_user(&app_state.db_pool, query.user_id)
        .await
        .map_err(|e| internal_error("Failed to load matched jobs", e))?;

    let jobs: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "job_id": row.job_id,
                "job_title": row.job_title,
                "company": row.company,
                "company_logo": row.company_logo,
                "location": row.location,
                "short_location": row.short_location,
                "remote": row.remote,
                "hybrid": row.hybrid,
                "url": row.url,
                "salary_string": row.salary_string,
                "seniority": row.seniority,
                "date_posted": row.date_posted,
                "status": row.status,
                "relevance_score": row.relevance_score.as_ref().map(|s| s.to_string()),
                "match_reasons": row.match_reasons.0,
                "preferences_hash": row.preferences_hash,
                "matched_at": row.created_at,
            })
        })
        .collect();

    Ok(Json(json!({ "count": jobs.len(), "jobs": jobs })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub user_id: Uuid,
    pub status: UserJobStatus,
}

/// Moves one matched job through its lifecycle (viewed, saved, applied,
/// hidden, rejected). Scores, reasons and the fingerprint stay untouched;
/// only the pipeline writes those.
pub async fn handle_update_job_status(
    State(app_state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, HandlerError> {
    let updated = db::user_jobs::update_status(&app_state.db_pool, req.user_id, job_id, req.status)
        .await
        .map_err(|e| internal_error("Failed to update job status", e))?;

    if updated == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No such job match for this user" })),
        ));
    }

    Ok(Json(json!({
        "job_id": job_id,
        "status": req.status
    })))
}
