use sqlx::{query_as, Error, FromRow, PgPool};
use uuid::Uuid;

use crate::utils::batching::chunk_vec;

#[derive(Debug, Clone, FromRow)]
pub struct JobScore {
    pub job_id: i64,
    pub score: f64,
}

/// Cosine similarity between the user's profile embedding and each candidate
/// job, computed inside Postgres. Candidates are chunked so a large backfill
/// never produces an oversized parameter list.
pub async fn similarity_scores(
    db_pool: &PgPool,
    user_id: Uuid,
    job_ids: &[i64],
    chunk_size: usize,
) -> Result<Vec<JobScore>, Error> {
    if job_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut scores: Vec<JobScore> = Vec::with_capacity(job_ids.len());

    for chunk in chunk_vec(job_ids, chunk_size) {
        let mut rows = query_as::<_, JobScore>(
            r#"
            SELECT
                j.id AS job_id,
                1 - (j.embedding <=> u.profile_embedding) AS score
            FROM jobs j
            JOIN users u ON u.id = $1
            WHERE j.id = ANY($2)
              AND j.embedding IS NOT NULL
              AND u.profile_embedding IS NOT NULL
            "#,
        )
        .bind(user_id)
        .bind(&chunk)
        .fetch_all(db_pool)
        .await?;

        scores.append(&mut rows);
    }

    Ok(scores)
}
