use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, Error, FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "run_status", rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, FromRow)]
pub struct SearchRunRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: RunStatus,
    pub last_step: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn create_run(db_pool: &PgPool, user_id: Uuid) -> Result<Uuid, Error> {
    let row: (Uuid,) = query_as(
        r#"
        INSERT INTO search_runs (user_id, status)
        VALUES ($1, 'running')
        RETURNING id
        "#,
    )
    .bind(user_id)
    .fetch_one(db_pool)
    .await?;

    Ok(row.0)
}

/// Records step completion. `updated_at` doubles as the liveness signal the
/// stale-run requeue watches.
pub async fn mark_step(db_pool: &PgPool, run_id: Uuid, step: &str) -> Result<(), Error> {
    query(
        r#"
        UPDATE search_runs
        SET last_step = $2,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(run_id)
    .bind(step)
    .execute(db_pool)
    .await?;

    Ok(())
}

pub async fn finish_run(
    db_pool: &PgPool,
    run_id: Uuid,
    status: RunStatus,
    message: Option<&str>,
    error: Option<&str>,
) -> Result<(), Error> {
    query(
        r#"
        UPDATE search_runs
        SET status = $2,
            message = $3,
            error = $4,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(run_id)
    .bind(status)
    .bind(message)
    .bind(error)
    .execute(db_pool)
    .await?;

    Ok(())
}

pub async fn fetch_run(db_pool: &PgPool, run_id: Uuid) -> Result<Option<SearchRunRow>, Error> {
    query_as::<_, SearchRunRow>(
        r#"
        SELECT
            id,
            user_id,
            status,
            last_step,
            message,
            error,
            started_at,
            updated_at
        FROM search_runs
        WHERE id = $1
        "#,
    )
    .bind(run_id)
    .fetch_optional(db_pool)
    .await
}

#[derive(Debug, Clone, FromRow)]
pub struct StaleRun {
    pub id: Uuid,
    pub user_id: Uuid,
}

/// Runs still marked running whose last heartbeat is older than the cutoff.
/// These are casualties of a crashed or restarted worker.
pub async fn stale_running_runs(
    db_pool: &PgPool,
    older_than_secs: i64,
) -> Result<Vec<StaleRun>, Error> {
    let cutoff: DateTime<Utc> = Utc::now() - chrono::Duration::seconds(older_than_secs);

    query_as::<_, StaleRun>(
        r#"
        SELECT id, user_id
        FROM search_runs
        WHERE status = 'running'
          AND updated_at < $1
        "#,
    )
    .bind(cutoff)
    .fetch_all(db_pool)
    .await
}
