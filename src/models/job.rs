use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use sqlx::types::{BigDecimal, Json};
use sqlx::FromRow;

use crate::utils::scores::fixed_decimal;

/// Company block nested inside a TheirStack job posting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCompany {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub industry: Option<String>,
    // The provider serves these as floats now and then; rounded at mapping.
    pub employee_count: Option<f64>,
    pub country_code: Option<String>,
    pub seo_description: Option<String>,
    pub linkedin_url: Option<String>,
    pub founded_year: Option<f64>,
    pub technology_slugs: Vec<String>,
}

/// One job posting as returned by the TheirStack search API. Only the fields
/// the service consumes are modeled; everything else is ignored on decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceJob {
    pub id: i64,
    pub job_title: String,
    pub normalized_title: Option<String>,
    pub description: String,
    pub url: Option<String>,
    pub company: String,
    pub company_domain: Option<String>,
    pub company_object: Option<SourceCompany>,
    pub location: Option<String>,
    pub short_location: Option<String>,
    pub state_code: Option<String>,
    pub country_code: Option<String>,
    pub remote: bool,
    pub hybrid: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub salary_string: Option<String>,
    pub min_annual_salary_usd: Option<f64>,
    pub max_annual_salary_usd: Option<f64>,
    pub avg_annual_salary_usd: Option<f64>,
    pub seniority: Option<String>,
    pub employment_statuses: Vec<String>,
    pub reposted: bool,
    pub date_reposted: Option<String>,
    pub easy_apply: bool,
    pub technology_slugs: Vec<String>,
    pub date_posted: Option<String>,
    pub discovered_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobSearchMetadata {
    pub total_results: i64,
    pub truncated_results: i64,
    pub total_companies: i64,
    pub truncated_companies: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobSearchResponse {
    pub metadata: JobSearchMetadata,
    pub data: Vec<SourceJob>,
}

/// Fully coerced row ready for insertion into `jobs`. All wire-level
/// sloppiness (float salaries, string dates, nested company object) is
/// resolved here so the store layer only binds typed columns.
#[derive(Debug, Clone)]
pub struct NewJobRecord {
    pub id: i64,
    pub job_title: String,
    pub normalized_title: Option<String>,
    pub description: String,
    pub url: Option<String>,
    pub company: String,
    pub company_domain: Option<String>,
    pub company_logo: Option<String>,
    pub company_industry: Option<String>,
    pub company_employee_count: Option<i32>,
    pub company_country_code: Option<String>,
    pub company_description: Option<String>,
    pub company_linkedin_url: Option<String>,
    pub company_founded_year: Option<i32>,
    pub company_technology_slugs: Vec<String>,
    pub location: Option<String>,
    pub short_location: Option<String>,
    pub state_code: Option<String>,
    pub country_code: Option<String>,
    pub remote: bool,
    pub hybrid: bool,
    pub latitude: Option<BigDecimal>,
    pub longitude: Option<BigDecimal>,
    pub salary_string: Option<String>,
    pub min_annual_salary_usd: Option<i32>,
    pub max_annual_salary_usd: Option<i32>,
    pub avg_annual_salary_usd: Option<i32>,
    pub seniority: Option<String>,
    pub employment_statuses: Vec<String>,
    pub reposted: bool,
    pub date_reposted: Option<DateTime<Utc>>,
    pub easy_apply: bool,
    pub technology_slugs: Vec<String>,
    pub date_posted: DateTime<Utc>,
    pub discovered_at: Option<DateTime<Utc>>,
    pub embedding: Option<Vector>,
}

impl NewJobRecord {
    pub fn from_source(job: &SourceJob, embedding: Option<Vec<f32>>) -> Self {
        let company = job.company_object.as_ref();

        Self {
            id: job.id,
            job_title: job.job_title.clone(),
            normalized_title: job.normalized_title.clone(),
            description: job.description.clone(),
            url: job.url.clone(),
            company: job.company.clone(),
            company_domain: job.company_domain.clone(),
            company_logo: company.and_then(|c| c.logo.clone()),
            company_industry: company.and_then(|c| c.industry.clone()),
            company_employee_count: company.and_then(|c| c.employee_count).and_then(round_int),
            company_country_code: company.and_then(|c| c.country_code.clone()),
            company_description: company.and_then(|c| c.seo_description.clone()),
            company_linkedin_url: company.and_then(|c| c.linkedin_url.clone()),
            company_founded_year: company.and_then(|c| c.founded_year).and_then(round_int),
            company_technology_slugs: company
                .map(|c| c.technology_slugs.clone())
                .unwrap_or_default(),
            location: job.location.clone(),
            short_location: job.short_location.clone(),
            state_code: job.state_code.clone(),
            country_code: job.country_code.clone(),
            remote: job.remote,
            hybrid: job.hybrid,
            latitude: job.latitude.map(|v| fixed_decimal(v, 6)),
            longitude: job.longitude.map(|v| fixed_decimal(v, 6)),
            salary_string: job.salary_string.clone(),
            min_annual_salary_usd: job.min_annual_salary_usd.and_then(round_int),
            max_annual_salary_usd: job.max_annual_salary_usd.and_then(round_int),
            avg_annual_salary_usd: job.avg_annual_salary_usd.and_then(round_int),
            seniority: job.seniority.clone(),
            employment_statuses: job.employment_statuses.clone(),
            reposted: job.reposted,
            easy_apply: job.easy_apply,
            date_reposted: parse_timestamp(job.date_reposted.as_deref()),
            technology_slugs: job.technology_slugs.clone(),
            date_posted: parse_timestamp(job.date_posted.as_deref()).unwrap_or_else(Utc::now),
            discovered_at: parse_timestamp(job.discovered_at.as_deref()),
            embedding: embedding.map(Vector::from),
        }
    }
}

/// Facets of a stored job that feed the rule-based match reasons.
#[derive(Debug, Clone, FromRow)]
pub struct JobFacets {
    pub id: i64,
    pub description: String,
    pub location: Option<String>,
    pub country_code: Option<String>,
    pub remote: bool,
    pub hybrid: bool,
    pub employment_statuses: Json<Vec<String>>,
    pub technology_slugs: Json<Vec<String>>,
}

// Rounds a wire-level float to the nearest integer column value. Values
// outside the i32 range (or non-finite) are dropped rather than wrapped.
fn round_int(value: f64) -> Option<i32> {
    let rounded = value.round();
    (rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64).then_some(rounded as i32)
}

// TheirStack sends plain dates for postings and full timestamps for
// discovery times. Accept both.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> SourceJob {
        serde_json::from_value(serde_json::json!({
            "id": 4211,
            "job_title": "Backend Engineer",
            "description": "Build services in Rust",
            "url": "https://jobs.example.com/4211",
            "company": "Acme",
            "company_object": {
                "logo": "https://cdn.example.com/acme.png",
                "employee_count": 320,
                "founded_year": 2014,
                "technology_slugs": ["rust", "postgresql"]
            },
            "latitude": 52.5200661,
            "longitude": 13.4049999,
            "min_annual_salary_usd": 85000.6,
            "remote": true,
            "technology_slugs": ["rust"],
            "date_posted": "2025-03-10",
            "discovered_at": "2025-03-11T08:15:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn coerces_wire_values_into_typed_columns() {
        let record = NewJobRecord::from_source(&sample_job(), Some(vec![0.1, 0.2]));

        assert_eq!(record.min_annual_salary_usd, Some(85001));
        assert_eq!(record.latitude.unwrap().to_string(), "52.520066");
        assert_eq!(record.company_employee_count, Some(320));
        assert_eq!(record.company_founded_year, Some(2014));
        assert_eq!(
            record.company_technology_slugs,
            vec!["rust".to_string(), "postgresql".to_string()]
        );
        assert_eq!(record.date_posted.to_rfc3339(), "2025-03-10T00:00:00+00:00");
        assert_eq!(
            record.discovered_at.unwrap().to_rfc3339(),
            "2025-03-11T08:15:00+00:00"
        );
        assert!(record.embedding.is_some());
    }

    #[test]
    fn missing_posting_date_falls_back_to_now() {
        let mut job = sample_job();
        job.date_posted = None;

        let before = Utc::now();
        let record = NewJobRecord::from_source(&job, None);
        let after = Utc::now();

        assert!(record.date_posted >= before && record.date_posted <= after);
        assert!(record.embedding.is_none());
    }

    #[test]
    fn non_integer_company_numbers_are_rounded_not_rejected() {
        let job: SourceJob = serde_json::from_value(serde_json::json!({
            "id": 4212,
            "job_title": "Backend Engineer",
            "description": "Build services in Rust",
            "company": "Acme",
            "company_object": {
                "employee_count": 320.6,
                "founded_year": 2014.2
            },
            "min_annual_salary_usd": 85000.6
        }))
        .unwrap();

        let record = NewJobRecord::from_source(&job, None);
        assert_eq!(record.company_employee_count, Some(321));
        assert_eq!(record.company_founded_year, Some(2014));
        assert_eq!(record.min_annual_salary_usd, Some(85001));
    }

    #[test]
    fn out_of_range_numbers_are_dropped() {
        assert_eq!(round_int(3.0e12), None);
        assert_eq!(round_int(f64::NAN), None);
        assert_eq!(round_int(-0.4), Some(0));
    }

    #[test]
    fn tolerates_sparse_payloads() {
        let job: SourceJob = serde_json::from_value(serde_json::json!({
            "id": 7,
            "job_title": "Engineer",
            "description": "",
            "company": "Tiny"
        }))
        .unwrap();

        let record = NewJobRecord::from_source(&job, None);
        assert!(record.company_logo.is_none());
        assert!(record.employment_statuses.is_empty());
        assert!(record.latitude.is_none());
    }
}
