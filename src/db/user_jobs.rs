use chrono::{DateTime, Utc};
use sqlx::types::{BigDecimal, Json};
use sqlx::{query, query_as, Error, FromRow, PgPool};
use uuid::Uuid;

use crate::models::preferences::UserJobStatus;

pub struct NewUserJob {
    pub user_id: Uuid,
    pub job_id: i64,
    pub status: UserJobStatus,
    pub relevance_score: BigDecimal,
    pub match_reasons: Vec<String>,
    pub preferences_hash: String,
}

/// Bulk-inserts ranked matches. Pairs already linked for this user are left
/// untouched so re-runs never clobber statuses or scores.
pub async fn store_user_jobs(db_pool: &PgPool, rows: &[NewUserJob]) -> Result<u64, Error> {
    if rows.is_empty() {
        return Ok(0);
    }

    let user_ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
    let job_ids: Vec<i64> = rows.iter().map(|r| r.job_id).collect();
    let statuses: Vec<UserJobStatus> = rows.iter().map(|r| r.status).collect();
    let scores: Vec<BigDecimal> = rows.iter().map(|r| r.relevance_score.clone()).collect();
    let reasons: Vec<Json<&Vec<String>>> = rows.iter().map(|r| Json(&r.match_reasons)).collect();
    let hashes: Vec<&str> = rows.iter().map(|r| r.preferences_hash.as_str()).collect();

    let result = query(
        r#"
        INSERT INTO user_jobs (
            user_id,
            job_id,
            status,
            relevance_score,
            match_reasons,
            preferences_hash
        )
        SELECT *
        FROM UNNEST(
            $1::uuid[],
            $2::bigint[],
            $3::user_job_status[],
            $4::numeric[],
            $5::jsonb[],
            $6::text[]
        )
        ON CONFLICT (user_id, job_id) DO NOTHING
        "#,
    )
    .bind(&user_ids)
    .bind(&job_ids)
    .bind(&statuses)
    .bind(&scores)
    .bind(&reasons)
    .bind(&hashes)
    .execute(db_pool)
    .await?;

    Ok(result.rows_affected())
}

/// Jobs already matched for this user under the given preference fingerprint.
pub async fn matched_job_ids(
    db_pool: &PgPool,
    user_id: Uuid,
    preferences_hash: &str,
) -> Result<Vec<i64>, Error> {
    let rows: Vec<(i64,)> = query_as(
        r#"
        SELECT job_id
        FROM user_jobs
        WHERE user_id = $1
          AND preferences_hash = $2
        "#,
    )
    .bind(user_id)
    .bind(preferences_hash)
    .fetch_all(db_pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

#[derive(Debug, FromRow)]
pub struct MatchedJobRow {
    pub job_id: i64,
    pub job_title: String,
    pub company: String,
    pub company_logo: Option<String>,
    pub location: Option<String>,
    pub short_location: Option<String>,
    pub remote: bool,
    pub hybrid: bool,
    pub url: Option<String>,
    pub salary_string: Option<String>,
    pub seniority: Option<String>,
    pub date_posted: DateTime<Utc>,
    pub status: UserJobStatus,
    pub relevance_score: Option<BigDecimal>,
    pub match_reasons: Json<Vec<String>>,
    pub preferences_hash: String,
    pub created_at: DateTime<Utc>,
}

pub async fn list_matches_for_user(
    db_pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<MatchedJobRow>, Error> {
    query_as::<_, MatchedJobRow>(
        r#"
        SELECT
            uj.job_id,
            j.job_title,
            j.company,
            j.company_logo,
            j.location,
            j.short_location,
            j.remote,
            j.hybrid,
            j.url,
            j.salary_string,
            j.seniority,
            j.date_posted,
            uj.status,
            uj.relevance_score,
            uj.match_reasons,
            uj.preferences_hash,
            uj.created_at
        FROM user_jobs uj
        JOIN jobs j ON j.id = uj.job_id
        WHERE uj.user_id = $1
        ORDER BY uj.relevance_score DESC NULLS LAST, uj.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db_pool)
    .await
}

pub async fn update_status(
    db_pool: &PgPool,
    user_id: Uuid,
    job_id: i64,
    status: UserJobStatus,
) -> Result<u64, Error> {
    let result = query(
        r#"
        UPDATE user_jobs
        SET status = $3,
            updated_at = now()
        WHERE user_id = $1
          AND job_id = $2
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .bind(status)
    .execute(db_pool)
    .await?;

    Ok(result.rows_affected())
}
