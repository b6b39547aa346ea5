use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::runs::RunStatus;
use crate::db::similarity::JobScore;
use crate::db::user_jobs::NewUserJob;
use crate::models::job::{JobFacets, NewJobRecord};
use crate::models::preferences::JobPreference;
use crate::models::profile::UserProfile;

/// Everything the matcher knows about a user before a run starts.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub profile: Option<UserProfile>,
    pub has_profile_embedding: bool,
    pub preferences: Option<JobPreference>,
}

/// Persistence seam for the matching pipeline. Production uses Postgres;
/// tests substitute an in-memory fake.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn load_user_context(&self, user_id: Uuid) -> Result<Option<UserContext>>;

    async fn all_job_ids(&self) -> Result<Vec<i64>>;

    async fn existing_job_ids(&self, ids: &[i64]) -> Result<Vec<i64>>;

    async fn insert_jobs(&self, jobs: &[NewJobRecord]) -> Result<u64>;

    async fn matched_job_ids(&self, user_id: Uuid, preferences_hash: &str) -> Result<Vec<i64>>;

    async fn similarity_scores(&self, user_id: Uuid, job_ids: &[i64]) -> Result<Vec<JobScore>>;

    async fn job_facets(&self, ids: &[i64]) -> Result<Vec<JobFacets>>;

    async fn insert_user_jobs(&self, rows: &[NewUserJob]) -> Result<u64>;

    async fn create_run(&self, user_id: Uuid) -> Result<Uuid>;

    async fn mark_step(&self, run_id: Uuid, step: &str) -> Result<()>;

    async fn finish_run(
        &self,
        run_id: Uuid,
        status: RunStatus,
        message: Option<&str>,
        error: Option<&str>,
    ) -> Result<()>;
}

pub struct PgMatchStore {
    pool: PgPool,
    similarity_chunk_size: usize,
}

impl PgMatchStore {
    pub fn new(pool: PgPool, similarity_chunk_size: usize) -> Self {
        Self {
            pool,
            similarity_chunk_size,
        }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn load_user_context(&self, user_id: Uuid) -> Result<Option<UserContext>> {
        let Some(row) = db::users::fetch_user_row(&self.pool, user_id).await? else {
            return Ok(None);
        };

        let profile: Option<UserProfile> = row
            .profile
            .map(serde_json::from_value)
            .transpose()
            .context("stored profile does not deserialize")?;

        let preferences = db::users::fetch_preferences(&self.pool, user_id).await?;

        Ok(Some(UserContext {
            profile,
            has_profile_embedding: row.has_profile_embedding,
            preferences,
        }))
    }

    async fn all_job_ids(&self) -> Result<Vec<i64>> {
        Ok(db::jobs::all_job_ids(&self.pool).await?)
    }

    async fn existing_job_ids(&self, ids: &[i64]) -> Result<Vec<i64>> {
        Ok(db::jobs::existing_job_ids(&self.pool, ids).await?)
    }

    async fn insert_jobs(&self, jobs: &[NewJobRecord]) -> Result<u64> {
        Ok(db::jobs::store_jobs(&self.pool, jobs).await?)
    }

    async fn matched_job_ids(&self, user_id: Uuid, preferences_hash: &str) -> Result<Vec<i64>> {
        Ok(db::user_jobs::matched_job_ids(&self.pool, user_id, preferences_hash).await?)
    }

    async fn similarity_scores(&self, user_id: Uuid, job_ids: &[i64]) -> Result<Vec<JobScore>> {
        Ok(db::similarity::similarity_scores(
            &self.pool,
            user_id,
            job_ids,
            self.similarity_chunk_size,
        )
        .await?)
    }

    async fn job_facets(&self, ids: &[i64]) -> Result<Vec<JobFacets>> {
        Ok(db::jobs::job_facets_by_ids(&self.pool, ids).await?)
    }

    async fn insert_user_jobs(&self, rows: &[NewUserJob]) -> Result<u64> {
        Ok(db::user_jobs::store_user_jobs(&self.pool, rows).await?)
    }

    async fn create_run(&self, user_id: Uuid) -> Result<Uuid> {
        Ok(db::runs::create_run(&self.pool, user_id).await?)
    }

    async fn mark_step(&self, run_id: Uuid, step: &str) -> Result<()> {
        Ok(db::runs::mark_step(&self.pool, run_id, step).await?)
    }

    async fn finish_run(
        &self,
        run_id: Uuid,
        status: RunStatus,
        message: Option<&str>,
        error: Option<&str>,
    ) -> Result<()> {
        Ok(db::runs::finish_run(&self.pool, run_id, status, message, error).await?)
    }
}
