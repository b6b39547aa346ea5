use chrono::{DateTime, Utc};
use pgvector::Vector;
use sqlx::types::{BigDecimal, Json};
use sqlx::{query, query_as, Error, PgPool};

use crate::models::job::{JobFacets, NewJobRecord};

pub async fn all_job_ids(db_pool: &PgPool) -> Result<Vec<i64>, Error> {
    let rows: Vec<(i64,)> = query_as("SELECT id FROM jobs")
        .fetch_all(db_pool)
        .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn existing_job_ids(db_pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<(i64,)> = query_as("SELECT id FROM jobs WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(db_pool)
        .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Bulk-inserts postings, skipping ids that already exist. Returns how many
/// rows were actually written.
pub async fn store_jobs(db_pool: &PgPool, jobs: &[NewJobRecord]) -> Result<u64, Error> {
    if jobs.is_empty() {
        return Ok(0);
    }

    let ids: Vec<i64> = jobs.iter().map(|j| j.id).collect();
    let job_titles: Vec<&str> = jobs.iter().map(|j| j.job_title.as_str()).collect();
    let normalized_titles: Vec<Option<&str>> =
        jobs.iter().map(|j| j.normalized_title.as_deref()).collect();
    let descriptions: Vec<&str> = jobs.iter().map(|j| j.description.as_str()).collect();
    let urls: Vec<Option<&str>> = jobs.iter().map(|j| j.url.as_deref()).collect();
    let companies: Vec<&str> = jobs.iter().map(|j| j.company.as_str()).collect();
    let company_domains: Vec<Option<&str>> =
        jobs.iter().map(|j| j.company_domain.as_deref()).collect();
    let company_logos: Vec<Option<&str>> =
        jobs.iter().map(|j| j.company_logo.as_deref()).collect();
    let company_industries: Vec<Option<&str>> =
        jobs.iter().map(|j| j.company_industry.as_deref()).collect();
    let company_employee_counts: Vec<Option<i32>> =
        jobs.iter().map(|j| j.company_employee_count).collect();
    let company_country_codes: Vec<Option<&str>> = jobs
        .iter()
        .map(|j| j.company_country_code.as_deref())
        .collect();
    let company_descriptions: Vec<Option<&str>> = jobs
        .iter()
        .map(|j| j.company_description.as_deref())
        .collect();
    let company_linkedin_urls: Vec<Option<&str>> = jobs
        .iter()
        .map(|j| j.company_linkedin_url.as_deref())
        .collect();
    let company_founded_years: Vec<Option<i32>> =
        jobs.iter().map(|j| j.company_founded_year).collect();
    let company_technology_slugs: Vec<Json<&Vec<String>>> = jobs
        .iter()
        .map(|j| Json(&j.company_technology_slugs))
        .collect();
    let locations: Vec<Option<&str>> = jobs.iter().map(|j| j.location.as_deref()).collect();
    let short_locations: Vec<Option<&str>> =
        jobs.iter().map(|j| j.short_location.as_deref()).collect();
    let state_codes: Vec<Option<&str>> = jobs.iter().map(|j| j.state_code.as_deref()).collect();
    let country_codes: Vec<Option<&str>> =
        jobs.iter().map(|j| j.country_code.as_deref()).collect();
    let remotes: Vec<bool> = jobs.iter().map(|j| j.remote).collect();
    let hybrids: Vec<bool> = jobs.iter().map(|j| j.hybrid).collect();
    let latitudes: Vec<Option<BigDecimal>> = jobs.iter().map(|j| j.latitude.clone()).collect();
    let longitudes: Vec<Option<BigDecimal>> = jobs.iter().map(|j| j.longitude.clone()).collect();
    let salary_strings: Vec<Option<&str>> =
        jobs.iter().map(|j| j.salary_string.as_deref()).collect();
    let min_salaries: Vec<Option<i32>> = jobs.iter().map(|j| j.min_annual_salary_usd).collect();
    let max_salaries: Vec<Option<i32>> = jobs.iter().map(|j| j.max_annual_salary_usd).collect();
    let avg_salaries: Vec<Option<i32>> = jobs.iter().map(|j| j.avg_annual_salary_usd).collect();
    let seniorities: Vec<Option<&str>> = jobs.iter().map(|j| j.seniority.as_deref()).collect();
    let employment_statuses: Vec<Json<&Vec<String>>> =
        jobs.iter().map(|j| Json(&j.employment_statuses)).collect();
    let reposteds: Vec<bool> = jobs.iter().map(|j| j.reposted).collect();
    let dates_reposted: Vec<Option<DateTime<Utc>>> =
        jobs.iter().map(|j| j.date_reposted).collect();
    let easy_applies: Vec<bool> = jobs.iter().map(|j| j.easy_apply).collect();
    let technology_slugs: Vec<Json<&Vec<String>>> =
        jobs.iter().map(|j| Json(&j.technology_slugs)).collect();
    let dates_posted: Vec<DateTime<Utc>> = jobs.iter().map(|j| j.date_posted).collect();
    let discovered_ats: Vec<Option<DateTime<Utc>>> =
        jobs.iter().map(|j| j.discovered_at).collect();
    let embeddings: Vec<Option<Vector>> = jobs.iter().map(|j| j.embedding.clone()).collect();

    let result = query(
        r#"
        INSERT INTO jobs (
            id,
            job_title,
            normalized_title,
            description,
            url,
            company,
            company_domain,
            company_logo,
            company_industry,
            company_employee_count,
            company_country_code,
            company_description,
            company_linkedin_url,
            company_founded_year,
            company_technology_slugs,
            location,
            short_location,
            state_code,
            country_code,
            remote,
            hybrid,
            latitude,
            longitude,
            salary_string,
            min_annual_salary_usd,
            max_annual_salary_usd,
            avg_annual_salary_usd,
            seniority,
            employment_statuses,
            reposted,
            date_reposted,
            easy_apply,
            technology_slugs,
            date_posted,
            discovered_at,
            embedding
        )
        SELECT *
        FROM UNNEST(
            $1::bigint[],
            $2::text[],
            $3::text[],
            $4::text[],
            $5::text[],
            $6::text[],
            $7::text[],
            $8::text[],
            $9::text[],
            $10::int[],
            $11::text[],
            $12::text[],
            $13::text[],
            $14::int[],
            $15::jsonb[],
            $16::text[],
            $17::text[],
            $18::text[],
            $19::text[],
            $20::boolean[],
            $21::boolean[],
            $22::numeric[],
            $23::numeric[],
            $24::text[],
            $25::int[],
            $26::int[],
            $27::int[],
            $28::text[],
            $29::jsonb[],
            $30::boolean[],
            $31::timestamptz[],
            $32::boolean[],
            $33::jsonb[],
            $34::timestamptz[],
            $35::timestamptz[],
            $36::vector[]
        )
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&ids)
    .bind(&job_titles)
    .bind(&normalized_titles)
    .bind(&descriptions)
    .bind(&urls)
    .bind(&companies)
    .bind(&company_domains)
    .bind(&company_logos)
    .bind(&company_industries)
    .bind(&company_employee_counts)
    .bind(&company_country_codes)
    .bind(&company_descriptions)
    .bind(&company_linkedin_urls)
    .bind(&company_founded_years)
    .bind(&company_technology_slugs)
    .bind(&locations)
    .bind(&short_locations)
    .bind(&state_codes)
    .bind(&country_codes)
    .bind(&remotes)
    .bind(&hybrids)
    .bind(&latitudes)
    .bind(&longitudes)
    .bind(&salary_strings)
    .bind(&min_salaries)
    .bind(&max_salaries)
    .bind(&avg_salaries)
    .bind(&seniorities)
    .bind(&employment_statuses)
    .bind(&reposteds)
    .bind(&dates_reposted)
    .bind(&easy_applies)
    .bind(&technology_slugs)
    .bind(&dates_posted)
    .bind(&discovered_ats)
    .bind(&embeddings)
    .execute(db_pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn job_facets_by_ids(db_pool: &PgPool, ids: &[i64]) -> Result<Vec<JobFacets>, Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    query_as::<_, JobFacets>(
        r#"
        SELECT
            id,
            description,
            location,
            country_code,
            remote,
            hybrid,
            employment_statuses,
            technology_slugs
        FROM jobs
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(db_pool)
    .await
}
