use pgvector::Vector;
use serde_json::Value;
use sqlx::{query, query_as, Error, FromRow, PgPool};
use uuid::Uuid;

use crate::models::preferences::{JobPreference, JobType, WorkMode};

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub profile: Option<Value>,
    pub has_profile_embedding: bool,
}

pub async fn fetch_user_row(db_pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>, Error> {
    query_as::<_, UserRow>(
        r#"
        SELECT
            profile,
            profile_embedding IS NOT NULL AS has_profile_embedding
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await
}

pub async fn fetch_preferences(
    db_pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<JobPreference>, Error> {
    query_as::<_, JobPreference>(
        r#"
        SELECT
            user_id,
            role,
            job_type,
            work_mode,
            location,
            created_at,
            updated_at
        FROM job_preferences
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await
}

pub async fn update_profile(
    db_pool: &PgPool,
    user_id: Uuid,
    profile: &Value,
    embedding: &Vector,
) -> Result<u64, Error> {
    let result = query(
        r#"
        UPDATE users
        SET profile = $2,
            profile_embedding = $3,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(profile)
    .bind(embedding)
    .execute(db_pool)
    .await?;

    Ok(result.rows_affected())
}

pub struct NewPreferences {
    pub user_id: Uuid,
    pub role: Vec<String>,
    pub job_type: JobType,
    pub work_mode: WorkMode,
    pub location: Vec<String>,
}

pub async fn upsert_preferences(
    db_pool: &PgPool,
    prefs: &NewPreferences,
) -> Result<JobPreference, Error> {
    query_as::<_, JobPreference>(
        r#"
        INSERT INTO job_preferences (user_id, role, job_type, work_mode, location)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE
        SET
            role = EXCLUDED.role,
            job_type = EXCLUDED.job_type,
            work_mode = EXCLUDED.work_mode,
            location = EXCLUDED.location,
            updated_at = now()
        RETURNING
            user_id,
            role,
            job_type,
            work_mode,
            location,
            created_at,
            updated_at
        "#,
    )
    .bind(prefs.user_id)
    .bind(&prefs.role)
    .bind(prefs.job_type)
    .bind(prefs.work_mode)
    .bind(&prefs.location)
    .fetch_one(db_pool)
    .await
}

/// Users with both a stored profile embedding and saved preferences. These
/// are the accounts the scheduled refresh re-runs searches for.
pub async fn users_ready_for_matching(db_pool: &PgPool) -> Result<Vec<Uuid>, Error> {
    let rows: Vec<(Uuid,)> = query_as(
        r#"
        SELECT u.id
        FROM users u
        JOIN job_preferences p ON p.user_id = u.id
        WHERE u.profile_embedding IS NOT NULL
        ORDER BY u.id
        "#,
    )
    .fetch_all(db_pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
