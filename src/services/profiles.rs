use anyhow::Result;
use axum::{extract::State, http::StatusCode, Json};
use pgvector::Vector;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::db;
use crate::db::users::NewPreferences;
use crate::events::publisher::publish_app_event;
use crate::models::events::{EventType, SearchRequested};
use crate::models::preferences::{JobType, WorkMode};
use crate::models::profile::UserProfile;
use crate::state::AppState;
use crate::utils::embedding_text::profile_embedding_text;

#[derive(Debug, PartialEq)]
pub enum SaveProfileOutcome {
    Saved,
    UnknownUser,
    Invalid(Vec<String>),
}

/// Checks a profile before it is embedded and stored. Returns the reasons it
/// was rejected; an empty list means it is acceptable.
pub fn validate_profile(profile: &UserProfile) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    let (name, email) = profile
        .personal_info
        .as_ref()
        .map(|info| (info.name.as_str(), info.email.as_str()))
        .unwrap_or(("", ""));

    if name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }

    if email.trim().is_empty() {
        errors.push("Email is required".to_string());
    } else if !email_like(email) {
        errors.push("Invalid email format".to_string());
    }

    for (index, exp) in profile.experience.iter().enumerate() {
        if let Some(start) = exp.start_date.as_deref().filter(|s| !s.is_empty()) {
            if !month_like(start) {
                errors.push(format!(
                    "Experience {}: Invalid start date format (YYYY-MM required)",
                    index + 1
                ));
            }
        }
        if let Some(end) = exp.end_date.as_deref().filter(|s| !s.is_empty()) {
            if !exp.is_current && !month_like(end) {
                errors.push(format!(
                    "Experience {}: Invalid end date format (YYYY-MM required)",
                    index + 1
                ));
            }
        }
    }

    for (index, edu) in profile.education.iter().enumerate() {
        if let Some(start) = edu.start_date.as_deref().filter(|s| !s.is_empty()) {
            if !month_like(start) {
                errors.push(format!(
                    "Education {}: Invalid start date format (YYYY-MM required)",
                    index + 1
                ));
            }
        }
        if let Some(end) = edu.end_date.as_deref().filter(|s| !s.is_empty()) {
            if !month_like(end) {
                errors.push(format!(
                    "Education {}: Invalid end date format (YYYY-MM required)",
                    index + 1
                ));
            }
        }
    }

    errors
}

fn email_like(s: &str) -> bool {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map(|re| re.is_match(s))
        .unwrap_or(false)
}

fn month_like(s: &str) -> bool {
    Regex::new(r"^\d{4}-\d{2}$")
        .map(|re| re.is_match(s))
        .unwrap_or(false)
}

/// Validates, embeds and persists a resume profile, then announces the
/// update so the matcher re-runs for this user.
pub async fn save_profile(
    state: &AppState,
    user_id: Uuid,
    profile: UserProfile,
) -> Result<SaveProfileOutcome> {
    let problems = validate_profile(&profile);
    if !problems.is_empty() {
        return Ok(SaveProfileOutcome::Invalid(problems));
    }

    // Checked up front so an unknown user never costs an embedding call.
    if db::users::fetch_user_row(&state.db_pool, user_id)
        .await?
        .is_none()
    {
        return Ok(SaveProfileOutcome::UnknownUser);
    }

    let text = profile_embedding_text(&profile);
    let embedding = state.matching.embeddings.embed_text(&text).await?;
    let vector = Vector::from(embedding);

    let value = serde_json::to_value(&profile)?;
    let updated = db::users::update_profile(&state.db_pool, user_id, &value, &vector).await?;
    if updated == 0 {
        return Ok(SaveProfileOutcome::UnknownUser);
    }

    info!("💾 Saved profile for user {}", user_id);

    let payload = serde_json::to_value(SearchRequested { user_id })?;
    if let Err(e) = publish_app_event(state, EventType::ProfileUpdated, payload).await {
        error!("❌ Failed to publish profile.updated event: {:?}", e);
    }

    Ok(SaveProfileOutcome::Saved)
}

type HandlerError = (StatusCode, Json<Value>);

fn internal_error(context: &str, e: impl std::fmt::Debug) -> HandlerError {
    error!("❌ {}: {:?}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": context })),
    )
}

#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    pub user_id: Uuid,
    pub profile: UserProfile,
}

pub async fn handle_save_profile(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SaveProfileRequest>,
) -> Result<Json<Value>, HandlerError> {
    match save_profile(&app_state, req.user_id, req.profile)
        .await
        .map_err(|e| internal_error("Failed to save profile", e))?
    {
        SaveProfileOutcome::Saved => Ok(Json(json!({
            "status": "saved",
            "user_id": req.user_id
        }))),
        SaveProfileOutcome::UnknownUser => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )),
        SaveProfileOutcome::Invalid(problems) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "Invalid profile",
                "problems": problems
            })),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct SavePreferencesRequest {
    pub user_id: Uuid,
    pub role: Vec<String>,
    pub job_type: JobType,
    pub work_mode: WorkMode,
    #[serde(default)]
    pub location: Vec<String>,
}

/// Wholesale upsert of a user's job preferences. A resubmission replaces
/// every field and kicks off a fresh search; the pipeline exits early if
/// the profile is not ready yet.
pub async fn handle_save_preferences(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SavePreferencesRequest>,
) -> Result<Json<Value>, HandlerError> {
    if req.role.is_empty() || req.role.len() > 2 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "Between 1 and 2 desired roles are required" })),
        ));
    }
    if req.location.len() > 2 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "At most 2 locations are allowed" })),
        ));
    }

    if db::users::fetch_user_row(&app_state.db_pool, req.user_id)
        .await
        .map_err(|e| internal_error("Failed to load user", e))?
        .is_none()
    {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        ));
    }

    let prefs = NewPreferences {
        user_id: req.user_id,
        role: req.role,
        job_type: req.job_type,
        work_mode: req.work_mode,
        location: req.location,
    };

    let stored = db::users::upsert_preferences(&app_state.db_pool, &prefs)
        .await
        .map_err(|e| internal_error("Failed to save preferences", e))?;

    let payload = serde_json::to_value(SearchRequested {
        user_id: req.user_id,
    })
    .map_err(|e| internal_error("Failed to encode search trigger", e))?;

    if let Err(e) = publish_app_event(&app_state, EventType::JobsSearchRequested, payload).await {
        error!("❌ Failed to queue search after preference update: {:?}", e);
    }

    Ok(Json(json!({
        "user_id": stored.user_id,
        "role": stored.role,
        "job_type": stored.job_type,
        "work_mode": stored.work_mode,
        "location": stored.location,
        "created_at": stored.created_at,
        "updated_at": stored.updated_at,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{EducationEntry, ExperienceEntry, PersonalInfo};

    fn valid_profile() -> UserProfile {
        UserProfile {
            personal_info: Some(PersonalInfo {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                ..Default::default()
            }),
            experience: vec![ExperienceEntry {
                company: "Analytical Engines".into(),
                position: "Engineer".into(),
                start_date: Some("2021-02".into()),
                end_date: Some("2023-06".into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn accepts_a_complete_profile() {
        assert!(validate_profile(&valid_profile()).is_empty());
    }

    #[test]
    fn requires_name_and_email() {
        let errors = validate_profile(&UserProfile::default());
        assert_eq!(errors, vec!["Name is required", "Email is required"]);
    }

    #[test]
    fn rejects_malformed_email() {
        let mut profile = valid_profile();
        profile.personal_info.as_mut().unwrap().email = "not-an-email".into();

        let errors = validate_profile(&profile);
        assert_eq!(errors, vec!["Invalid email format"]);
    }

    #[test]
    fn rejects_malformed_experience_dates() {
        let mut profile = valid_profile();
        profile.experience[0].start_date = Some("2021-3".into());
        profile.experience[0].end_date = Some("June 2023".into());

        let errors = validate_profile(&profile);
        assert_eq!(
            errors,
            vec![
                "Experience 1: Invalid start date format (YYYY-MM required)",
                "Experience 1: Invalid end date format (YYYY-MM required)",
            ]
        );
    }

    #[test]
    fn current_roles_skip_end_date_validation() {
        let mut profile = valid_profile();
        profile.experience[0].is_current = true;
        profile.experience[0].end_date = Some("whenever".into());

        assert!(validate_profile(&profile).is_empty());
    }

    #[test]
    fn education_dates_are_validated() {
        let mut profile = valid_profile();
        profile.education = vec![EducationEntry {
            degree: "BSc".into(),
            school: "University".into(),
            end_date: Some("2020".into()),
            ..Default::default()
        }];

        let errors = validate_profile(&profile);
        assert_eq!(
            errors,
            vec!["Education 1: Invalid end date format (YYYY-MM required)"]
        );
    }
}
