use std::collections::HashSet;

use regex::Regex;

use crate::models::job::JobFacets;
use crate::models::preferences::{JobPreference, WorkMode};
use crate::models::profile::UserProfile;

/// Rule-based explanations for why a job was matched. Produces at most one
/// reason per group, in a fixed group order: work mode, employment type,
/// location, skills.
pub fn match_reasons(
    job: &JobFacets,
    prefs: &JobPreference,
    profile: &UserProfile,
) -> Vec<String> {
    let mut reasons: Vec<String> = Vec::new();

    // 1. Work mode
    if job.remote && prefs.work_mode == WorkMode::Remote {
        reasons.push("Remote work aligns perfectly with your preferences".to_string());
    } else if job.hybrid && prefs.work_mode == WorkMode::Hybrid {
        reasons.push("Hybrid work aligns with your preferences".to_string());
    } else if !job.remote && !job.hybrid && prefs.work_mode == WorkMode::OnSite {
        reasons.push("On-site work aligns with your preferences".to_string());
    } else if job.remote {
        reasons.push("This role offers remote work".to_string());
    }

    // 2. Employment type. "full-time" and "FULL_TIME" must compare equal.
    let requested_type = prefs.job_type.as_str().replace('-', "");
    if !job.employment_statuses.0.is_empty() {
        let matches_category = job
            .employment_statuses
            .0
            .iter()
            .any(|status| status.to_lowercase().replace('_', "") == requested_type);
        if matches_category {
            reasons.push(format!(
                "Matches your preference for {} roles",
                prefs.job_type.as_str()
            ));
        }
    }

    // 3. Location. A country-code hit outranks a substring hit on the
    // free-form location.
    let pref_locations_lower: Vec<String> =
        prefs.location.iter().map(|l| l.to_lowercase()).collect();
    let country_code = job.country_code.as_deref().unwrap_or("");
    let location = job.location.as_deref().unwrap_or("");

    if !country_code.is_empty() && pref_locations_lower.contains(&country_code.to_lowercase()) {
        reasons.push(format!("Located in your preferred country ({})", country_code));
    } else if !location.is_empty() && {
        let location_lower = location.to_lowercase();
        pref_locations_lower
            .iter()
            .any(|l| location_lower.contains(l.as_str()))
    } {
        reasons.push("Located in one of your preferred regions".to_string());
    }

    // 4. Skills. Prefer the curated technology slugs; fall back to scanning
    // the description for whole-word skill mentions.
    if let Some(skills) = &profile.skills {
        let user_skills: Vec<String> = skills
            .flattened()
            .iter()
            .map(|s| s.to_lowercase())
            .collect();

        let mut matched_skills: Vec<String> = if !job.technology_slugs.0.is_empty() {
            job.technology_slugs
                .0
                .iter()
                .filter(|slug| user_skills.contains(&slug.to_lowercase()))
                .cloned()
                .collect()
        } else {
            let description_lower = job.description.to_lowercase();
            user_skills
                .iter()
                .filter(|skill| word_match(&description_lower, skill))
                .cloned()
                .collect()
        };

        let mut seen: HashSet<String> = HashSet::new();
        matched_skills.retain(|s| seen.insert(s.clone()));

        if !matched_skills.is_empty() {
            let display: Vec<String> = matched_skills
                .iter()
                .take(5)
                .map(|s| title_case(s))
                .collect();
            reasons.push(format!("Matches your skills in {}", display.join(", ")));
        }
    }

    reasons
}

fn word_match(text: &str, token: &str) -> bool {
    Regex::new(&format!(r"\b{}\b", regex::escape(token)))
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::preferences::JobType;
    use crate::models::profile::SkillSet;
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn facets() -> JobFacets {
        JobFacets {
            id: 1,
            description: String::new(),
            location: None,
            country_code: None,
            remote: false,
            hybrid: false,
            employment_statuses: Json(Vec::new()),
            technology_slugs: Json(Vec::new()),
        }
    }

    fn prefs(work_mode: WorkMode) -> JobPreference {
        JobPreference {
            user_id: Uuid::new_v4(),
            role: vec!["Engineer".into()],
            job_type: JobType::FullTime,
            work_mode,
            location: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn profile_with_skills(skills: &[&str]) -> UserProfile {
        UserProfile {
            skills: Some(SkillSet {
                languages: skills.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn remote_preference_on_remote_job() {
        let mut job = facets();
        job.remote = true;

        let reasons = match_reasons(&job, &prefs(WorkMode::Remote), &UserProfile::default());
        assert_eq!(
            reasons,
            vec!["Remote work aligns perfectly with your preferences"]
        );
    }

    #[test]
    fn hybrid_and_on_site_alignments() {
        let mut hybrid_job = facets();
        hybrid_job.hybrid = true;
        assert_eq!(
            match_reasons(&hybrid_job, &prefs(WorkMode::Hybrid), &UserProfile::default()),
            vec!["Hybrid work aligns with your preferences"]
        );

        let on_site_job = facets();
        assert_eq!(
            match_reasons(&on_site_job, &prefs(WorkMode::OnSite), &UserProfile::default()),
            vec!["On-site work aligns with your preferences"]
        );
    }

    #[test]
    fn remote_job_is_still_worth_mentioning() {
        let mut job = facets();
        job.remote = true;

        let reasons = match_reasons(&job, &prefs(WorkMode::OnSite), &UserProfile::default());
        assert_eq!(reasons, vec!["This role offers remote work"]);
    }

    #[test]
    fn employment_status_matches_across_separators() {
        let mut job = facets();
        job.employment_statuses = Json(vec!["FULL_TIME".into()]);

        let reasons = match_reasons(&job, &prefs(WorkMode::OnSite), &UserProfile::default());
        assert!(reasons.contains(&"Matches your preference for full-time roles".to_string()));
    }

    #[test]
    fn mismatched_employment_status_adds_nothing() {
        let mut job = facets();
        job.employment_statuses = Json(vec!["CONTRACT".into()]);

        let reasons = match_reasons(&job, &prefs(WorkMode::OnSite), &UserProfile::default());
        assert!(!reasons.iter().any(|r| r.starts_with("Matches your preference")));
    }

    #[test]
    fn country_code_hit_beats_region_hit() {
        let mut job = facets();
        job.country_code = Some("DE".into());
        job.location = Some("Berlin, Germany".into());

        let mut preferences = prefs(WorkMode::OnSite);
        preferences.location = vec!["de".into(), "germany".into()];

        let reasons = match_reasons(&job, &preferences, &UserProfile::default());
        assert!(reasons.contains(&"Located in your preferred country (DE)".to_string()));
        assert!(!reasons.contains(&"Located in one of your preferred regions".to_string()));
    }

    #[test]
    fn region_substring_match() {
        let mut job = facets();
        job.location = Some("Remote, Germany".into());

        let mut preferences = prefs(WorkMode::OnSite);
        preferences.location = vec!["germany".into()];

        let reasons = match_reasons(&job, &preferences, &UserProfile::default());
        assert!(reasons.contains(&"Located in one of your preferred regions".to_string()));
    }

    #[test]
    fn skills_from_slugs_keep_source_casing() {
        let mut job = facets();
        job.technology_slugs = Json(vec!["Rust".into(), "postgresql".into(), "go".into()]);

        let profile = profile_with_skills(&["rust", "PostgreSQL"]);
        let reasons = match_reasons(&job, &prefs(WorkMode::OnSite), &profile);

        assert!(reasons.contains(&"Matches your skills in Rust, Postgresql".to_string()));
    }

    #[test]
    fn skills_fall_back_to_whole_word_description_scan() {
        let mut job = facets();
        job.description = "We ship Python services and javascript tooling".into();

        let profile = profile_with_skills(&["python", "java"]);
        let reasons = match_reasons(&job, &prefs(WorkMode::OnSite), &profile);

        // "java" must not match inside "javascript"
        assert!(reasons.contains(&"Matches your skills in Python".to_string()));
    }

    #[test]
    fn skill_display_caps_at_five() {
        let mut job = facets();
        job.technology_slugs = Json(vec![
            "rust".into(),
            "go".into(),
            "python".into(),
            "redis".into(),
            "postgresql".into(),
            "kafka".into(),
        ]);

        let profile =
            profile_with_skills(&["rust", "go", "python", "redis", "postgresql", "kafka"]);
        let reasons = match_reasons(&job, &prefs(WorkMode::OnSite), &profile);

        let skills_reason = reasons
            .iter()
            .find(|r| r.starts_with("Matches your skills"))
            .unwrap();
        assert_eq!(skills_reason.matches(',').count(), 4);
    }

    #[test]
    fn duplicate_skill_matches_collapse() {
        let mut job = facets();
        job.technology_slugs = Json(vec!["rust".into(), "rust".into()]);

        let profile = profile_with_skills(&["rust"]);
        let reasons = match_reasons(&job, &prefs(WorkMode::OnSite), &profile);

        assert!(reasons.contains(&"Matches your skills in Rust".to_string()));
    }

    #[test]
    fn groups_emit_in_fixed_order() {
        let mut job = facets();
        job.remote = true;
        job.country_code = Some("US".into());
        job.employment_statuses = Json(vec!["full_time".into()]);
        job.technology_slugs = Json(vec!["rust".into()]);

        let mut preferences = prefs(WorkMode::Remote);
        preferences.location = vec!["us".into()];
        let profile = profile_with_skills(&["rust"]);

        let reasons = match_reasons(&job, &preferences, &profile);
        assert_eq!(
            reasons,
            vec![
                "Remote work aligns perfectly with your preferences",
                "Matches your preference for full-time roles",
                "Located in your preferred country (US)",
                "Matches your skills in Rust",
            ]
        );
    }
}
