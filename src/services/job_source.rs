use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TheirStackConfig;
use crate::models::job::JobSearchResponse;
use crate::models::preferences::{JobPreference, WorkMode};
use crate::services::seniority::SeniorityTier;
use crate::utils::http_client::{get_json, post_json};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationFilter {
    pub id: u64,
}

/// Body of a TheirStack `/v1/jobs/search` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSearchQuery {
    pub job_title_or: Vec<String>,
    pub employment_statuses_or: Vec<String>,
    pub remote: bool,
    pub job_location_or: Vec<LocationFilter>,
    pub posted_at_max_age_days: u32,
    pub job_seniority_or: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub job_id_not: Vec<i64>,
}

pub fn build_search_query(
    prefs: &JobPreference,
    seniority: SeniorityTier,
    location_ids: &[u64],
    known_job_ids: &[i64],
    posted_max_age_days: u32,
) -> JobSearchQuery {
    JobSearchQuery {
        job_title_or: prefs.role.clone(),
        // "full-time" preference maps to the API's "full_time" status
        employment_statuses_or: vec![prefs.job_type.as_str().replace('-', "_")],
        remote: matches!(prefs.work_mode, WorkMode::Remote | WorkMode::Hybrid),
        job_location_or: location_ids
            .iter()
            .map(|&id| LocationFilter { id })
            .collect(),
        posted_at_max_age_days: posted_max_age_days,
        job_seniority_or: vec![seniority.as_str().to_string()],
        job_id_not: known_job_ids.to_vec(),
    }
}

/// External job board seam. Production talks to TheirStack; tests substitute
/// a programmed fake.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn search_jobs(&self, query: &JobSearchQuery) -> Result<JobSearchResponse>;

    async fn lookup_location(&self, name: &str) -> Result<Option<u64>>;
}

pub struct TheirStackClient {
    config: TheirStackConfig,
}

impl TheirStackClient {
    pub fn new(config: TheirStackConfig) -> Self {
        Self { config }
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
                .context("api key is not a valid header value")?,
        );
        Ok(headers)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocationLookupResponse {
    data: Vec<LocationCandidate>,
}

#[derive(Debug, Deserialize)]
struct LocationCandidate {
    id: u64,
}

#[async_trait]
impl JobSource for TheirStackClient {
    async fn search_jobs(&self, query: &JobSearchQuery) -> Result<JobSearchResponse> {
        let url = format!("{}/v1/jobs/search", self.config.base_url);
        let body = serde_json::to_value(query)?;

        let raw = post_json(&url, body, Some(self.auth_headers()?)).await?;
        let parsed: JobSearchResponse =
            serde_json::from_value(raw).context("unexpected job search response shape")?;

        info!(
            "📥 Fetched {} jobs ({} total matches)",
            parsed.data.len(),
            parsed.metadata.total_results
        );

        Ok(parsed)
    }

    async fn lookup_location(&self, name: &str) -> Result<Option<u64>> {
        let url = format!("{}/v0/catalog/locations", self.config.base_url);

        let raw = get_json(&url, &[("name", name)], self.auth_headers()?).await?;
        let parsed: LocationLookupResponse =
            serde_json::from_value(raw).context("unexpected location lookup response shape")?;

        Ok(parsed.data.first().map(|candidate| candidate.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::preferences::JobType;
    use chrono::Utc;
    use uuid::Uuid;

    fn prefs(job_type: JobType, work_mode: WorkMode) -> JobPreference {
        JobPreference {
            user_id: Uuid::new_v4(),
            role: vec!["Backend Engineer".into()],
            job_type,
            work_mode,
            location: vec!["Germany".into()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn serializes_the_search_body() {
        let query = build_search_query(
            &prefs(JobType::FullTime, WorkMode::Remote),
            SeniorityTier::Senior,
            &[12043],
            &[101, 102],
            15,
        );
        let body = serde_json::to_value(&query).unwrap();

        assert_eq!(body["job_title_or"], serde_json::json!(["Backend Engineer"]));
        assert_eq!(body["employment_statuses_or"], serde_json::json!(["full_time"]));
        assert_eq!(body["job_location_or"], serde_json::json!([{ "id": 12043 }]));
        assert_eq!(body["posted_at_max_age_days"], serde_json::json!(15));
        assert_eq!(body["job_seniority_or"], serde_json::json!(["senior"]));
        assert_eq!(body["job_id_not"], serde_json::json!([101, 102]));
    }

    #[test]
    fn omits_exclusions_when_nothing_is_known() {
        let query = build_search_query(
            &prefs(JobType::Contract, WorkMode::OnSite),
            SeniorityTier::Junior,
            &[],
            &[],
            15,
        );
        let body = serde_json::to_value(&query).unwrap();

        assert!(body.get("job_id_not").is_none());
        assert_eq!(body["remote"], serde_json::json!(false));
    }

    #[test]
    fn hybrid_preference_requests_remote_listings() {
        let query = build_search_query(
            &prefs(JobType::PartTime, WorkMode::Hybrid),
            SeniorityTier::MidLevel,
            &[],
            &[],
            30,
        );

        assert!(query.remote);
        assert_eq!(query.employment_statuses_or, vec!["part_time"]);
        assert_eq!(query.job_seniority_or, vec!["mid_level"]);
    }
}
