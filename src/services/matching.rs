use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, ensure, Context, Result};
use deadpool_redis::Pool;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::runs::RunStatus;
use crate::db::similarity::JobScore;
use crate::db::store::{MatchStore, PgMatchStore};
use crate::db::user_jobs::NewUserJob;
use crate::models::job::{JobSearchResponse, NewJobRecord, SourceJob};
use crate::models::preferences::{JobPreference, UserJobStatus};
use crate::models::profile::{ExperienceEntry, UserProfile};
use crate::services::embeddings::{EmbeddingProvider, GeminiEmbeddingClient};
use crate::services::fingerprint::preference_fingerprint;
use crate::services::job_source::{build_search_query, JobSource, TheirStackClient};
use crate::services::reasons::match_reasons;
use crate::services::seniority::infer_seniority;
use crate::utils::embedding_text::job_embedding_text;
use crate::utils::logging::format_duration;
use crate::utils::scores::clamp_score;

pub const STEP_LOAD_USER: &str = "load-user";
pub const STEP_FETCH_JOBS: &str = "fetch-jobs";
pub const STEP_DIFF_KNOWN: &str = "diff-known";
pub const STEP_EMBED_JOBS: &str = "embed-jobs";
pub const STEP_STORE_JOBS: &str = "store-jobs";
pub const STEP_BACKFILL: &str = "backfill";
pub const STEP_RANK: &str = "rank";
pub const STEP_PERSIST_MATCHES: &str = "persist-matches";

pub const NO_PROFILE_MESSAGE: &str = "No resume profile available to match jobs.";
pub const NO_PREFERENCES_MESSAGE: &str = "No job preferences available to match jobs.";
pub const NO_JOBS_MESSAGE: &str = "No jobs found for these preferences.";
pub const COMPLETED_MESSAGE: &str = "Job search and scoring completed.";

#[derive(Debug, Clone)]
pub struct MatchingSettings {
    pub step_attempts: u32,
    pub retry_backoff_ms: u64,
    pub posted_max_age_days: u32,
}

/// Injected collaborators of the matching pipeline. Every external system
/// sits behind a trait so tests can run the full pipeline in memory.
pub struct MatchingDeps {
    pub store: Arc<dyn MatchStore>,
    pub source: Arc<dyn JobSource>,
    pub embeddings: Arc<dyn EmbeddingProvider>,
    pub settings: MatchingSettings,
}

impl MatchingDeps {
    pub fn from_config(config: &AppConfig, db_pool: PgPool, redis_pool: Pool) -> Self {
        Self {
            store: Arc::new(PgMatchStore::new(
                db_pool,
                config.matching.similarity_chunk_size,
            )),
            source: Arc::new(TheirStackClient::new(config.theirstack.clone())),
            embeddings: Arc::new(GeminiEmbeddingClient::new(
                config.gcp.clone(),
                redis_pool,
                config.cache.embedding_ttl_secs,
            )),
            settings: MatchingSettings {
                step_attempts: config.matching.step_attempts,
                retry_backoff_ms: config.matching.retry_backoff_ms,
                posted_max_age_days: config.theirstack.posted_max_age_days,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub message: String,
    pub matched: usize,
}

impl SearchOutcome {
    fn skipped(message: &str) -> Self {
        Self {
            message: message.to_string(),
            matched: 0,
        }
    }
}

type StepFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Runs one pipeline step with bounded retries, then records it as the
/// run's cursor. Steps are written to tolerate re-execution, so a retry
/// never corrupts state.
async fn run_step<'a, T, F>(
    deps: &MatchingDeps,
    run_id: Uuid,
    step: &'static str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> StepFuture<'a, T>,
{
    let attempts = deps.settings.step_attempts.max(1);
    let mut attempt: u32 = 1;

    let value = loop {
        match op().await {
            Ok(value) => break value,
            Err(err) if attempt < attempts => {
                let backoff = deps
                    .settings
                    .retry_backoff_ms
                    .saturating_mul(1u64 << (attempt - 1).min(6));
                warn!(
                    "⚠️ Step `{}` attempt {} failed, retrying in {}ms: {:?}",
                    step, attempt, backoff, err
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(err.context(format!("step `{step}` failed after {attempt} attempts")));
            }
        }
    };

    deps.store
        .mark_step(run_id, step)
        .await
        .with_context(|| format!("failed to record step `{step}`"))?;

    Ok(value)
}

/// Executes one full search run for a user and records its lifecycle in
/// `search_runs`. Early exits for missing prerequisites complete the run
/// with a descriptive message rather than failing it.
pub async fn run_search(deps: &MatchingDeps, user_id: Uuid) -> Result<SearchOutcome> {
    let start = Instant::now();

    let run_id = deps
        .store
        .create_run(user_id)
        .await
        .context("failed to create search run")?;

    info!("🔄 Starting search run {} for user {}", run_id, user_id);

    match execute_run(deps, run_id, user_id).await {
        Ok(outcome) => {
            deps.store
                .finish_run(run_id, RunStatus::Completed, Some(&outcome.message), None)
                .await
                .context("failed to record run completion")?;

            info!(
                "✅ Search run {} completed in {}: {} ({} matched)",
                run_id,
                format_duration(start.elapsed()),
                outcome.message,
                outcome.matched
            );
            info!(
                target: "perf",
                "search run {} for user {} took {}",
                run_id,
                user_id,
                format_duration(start.elapsed())
            );

            Ok(outcome)
        }
        Err(err) => {
            let detail = format!("{err:#}");
            if let Err(finish_err) = deps
                .store
                .finish_run(run_id, RunStatus::Failed, None, Some(&detail))
                .await
            {
                error!(
                    "❌ Failed to record failure of run {}: {:?}",
                    run_id, finish_err
                );
            }

            error!(
                "💥 Search run {} failed after {}: {}",
                run_id,
                format_duration(start.elapsed()),
                detail
            );

            Err(err)
        }
    }
}

async fn execute_run(deps: &MatchingDeps, run_id: Uuid, user_id: Uuid) -> Result<SearchOutcome> {
    // 1. Who are we matching for?
    let context = run_step(deps, run_id, STEP_LOAD_USER, || {
        Box::pin(async move { deps.store.load_user_context(user_id).await })
    })
    .await?;

    let Some(context) = context else {
        bail!("user {user_id} not found");
    };

    let (Some(profile), true) = (context.profile, context.has_profile_embedding) else {
        return Ok(SearchOutcome::skipped(NO_PROFILE_MESSAGE));
    };
    let Some(preferences) = context.preferences else {
        return Ok(SearchOutcome::skipped(NO_PREFERENCES_MESSAGE));
    };

    // 2. Ask the job board for fresh candidates, excluding everything the
    // store has already seen.
    let prefs_ref = &preferences;
    let experience = &profile.experience;
    let response = run_step(deps, run_id, STEP_FETCH_JOBS, || {
        Box::pin(async move { fetch_candidate_jobs(deps, prefs_ref, experience).await })
    })
    .await?;

    if response.data.is_empty() {
        return Ok(SearchOutcome::skipped(NO_JOBS_MESSAGE));
    }

    let jobs = response.data;
    let fetched_ids: Vec<i64> = jobs.iter().map(|j| j.id).collect();

    // 3. Separate genuinely new postings from ones the store already holds.
    let fetched_ref = &fetched_ids;
    let existing = run_step(deps, run_id, STEP_DIFF_KNOWN, || {
        Box::pin(async move { deps.store.existing_job_ids(fetched_ref).await })
    })
    .await?;

    let existing_ids: HashSet<i64> = existing.into_iter().collect();
    let new_jobs: Vec<&SourceJob> = jobs
        .iter()
        .filter(|j| !existing_ids.contains(&j.id))
        .collect();

    info!(
        "🆕 {} new jobs out of {} fetched for user {}",
        new_jobs.len(),
        jobs.len(),
        user_id
    );

    // 4. Embed only the new postings. Known jobs keep their first embedding.
    let texts: Vec<String> = new_jobs.iter().map(|job| job_embedding_text(job)).collect();
    let texts_ref = &texts;
    let embeddings = run_step(deps, run_id, STEP_EMBED_JOBS, || {
        Box::pin(async move { deps.embeddings.embed_batch(texts_ref).await })
    })
    .await?;

    ensure!(
        embeddings.len() == new_jobs.len(),
        "embedding provider returned {} vectors for {} jobs",
        embeddings.len(),
        new_jobs.len()
    );

    // 5. Persist the new postings. Conflicting ids are left untouched.
    let records: Vec<NewJobRecord> = new_jobs
        .iter()
        .zip(embeddings)
        .map(|(job, embedding)| NewJobRecord::from_source(job, Some(embedding)))
        .collect();

    let records_ref = &records;
    let inserted = run_step(deps, run_id, STEP_STORE_JOBS, || {
        Box::pin(async move { deps.store.insert_jobs(records_ref).await })
    })
    .await?;

    info!(
        "💾 Stored {} new jobs ({} fetched were already known)",
        inserted,
        existing_ids.len()
    );

    // 6. Pull previously matched jobs for this exact preference fingerprint
    // back into the candidate set, so the match list stays stable when the
    // board's result page shifts between runs.
    let fingerprint = preference_fingerprint(&preferences);
    let fingerprint_ref = fingerprint.as_str();
    let already_matched = run_step(deps, run_id, STEP_BACKFILL, || {
        Box::pin(async move { deps.store.matched_job_ids(user_id, fingerprint_ref).await })
    })
    .await?;

    let fetched_id_set: HashSet<i64> = fetched_ids.iter().copied().collect();
    let backfill_ids: Vec<i64> = already_matched
        .into_iter()
        .filter(|id| !fetched_id_set.contains(id))
        .collect();

    if !backfill_ids.is_empty() {
        info!(
            "📚 Backfilling {} previously matched jobs into the ranking set",
            backfill_ids.len()
        );
    }

    let mut candidate_ids = fetched_ids.clone();
    candidate_ids.extend(&backfill_ids);

    // 7. Score the whole candidate set against the profile embedding.
    let candidates_ref = &candidate_ids;
    let mut scores = run_step(deps, run_id, STEP_RANK, || {
        Box::pin(async move { deps.store.similarity_scores(user_id, candidates_ref).await })
    })
    .await?;

    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // 8. Explain and persist the ranked matches.
    let scores_ref = &scores[..];
    let profile_ref = &profile;
    let matched = run_step(deps, run_id, STEP_PERSIST_MATCHES, || {
        Box::pin(async move {
            persist_ranked_matches(deps, user_id, scores_ref, prefs_ref, profile_ref, fingerprint_ref)
                .await
        })
    })
    .await?;

    Ok(SearchOutcome {
        message: COMPLETED_MESSAGE.to_string(),
        matched,
    })
}

async fn fetch_candidate_jobs(
    deps: &MatchingDeps,
    prefs: &JobPreference,
    experience: &[ExperienceEntry],
) -> Result<JobSearchResponse> {
    let known_job_ids = deps.store.all_job_ids().await?;

    let mut location_ids: Vec<u64> = Vec::with_capacity(prefs.location.len());
    for name in &prefs.location {
        match deps.source.lookup_location(name).await? {
            Some(id) => location_ids.push(id),
            None => warn!(
                "⚠️ Could not resolve location '{}', dropping it from the filter",
                name
            ),
        }
    }

    let seniority = infer_seniority(experience);
    let query = build_search_query(
        prefs,
        seniority,
        &location_ids,
        &known_job_ids,
        deps.settings.posted_max_age_days,
    );

    deps.source.search_jobs(&query).await
}

async fn persist_ranked_matches(
    deps: &MatchingDeps,
    user_id: Uuid,
    scores: &[JobScore],
    prefs: &JobPreference,
    profile: &UserProfile,
    fingerprint: &str,
) -> Result<usize> {
    if scores.is_empty() {
        return Ok(0);
    }

    let ids: Vec<i64> = scores.iter().map(|s| s.job_id).collect();
    let facets = deps.store.job_facets(&ids).await?;
    let facets_by_id: HashMap<i64, _> = facets.iter().map(|f| (f.id, f)).collect();

    let mut rows: Vec<NewUserJob> = Vec::with_capacity(scores.len());
    for score in scores {
        let Some(facets) = facets_by_id.get(&score.job_id) else {
            warn!(
                "⚠️ Job {} vanished before reasons could be generated, skipping",
                score.job_id
            );
            continue;
        };

        rows.push(NewUserJob {
            user_id,
            job_id: score.job_id,
            status: UserJobStatus::New,
            relevance_score: clamp_score(score.score),
            match_reasons: match_reasons(facets, prefs, profile),
            preferences_hash: fingerprint.to_string(),
        });
    }

    deps.store.insert_user_jobs(&rows).await?;

    Ok(rows.len())
}
