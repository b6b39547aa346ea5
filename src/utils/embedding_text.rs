use crate::models::job::SourceJob;
use crate::models::profile::{ExperienceEntry, UserProfile};

/// Text rendition of a job posting handed to the embedding model.
pub fn job_embedding_text(job: &SourceJob) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.push(format!("Title: {}", job.job_title));
    parts.push(format!("Company: {}", job.company));
    if !job.description.is_empty() {
        parts.push(format!("Description:\n{}", job.description));
    }
    if !job.technology_slugs.is_empty() {
        parts.push(format!("Technologies: {}", job.technology_slugs.join(", ")));
    }
    parts.join("\n\n")
}

/// Text rendition of a resume profile handed to the embedding model. Empty
/// sections are omitted so sparse profiles do not embed filler labels.
pub fn profile_embedding_text(profile: &UserProfile) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(info) = &profile.personal_info {
        if !info.name.is_empty() {
            parts.push(format!("Name: {}", info.name));
        }
    }

    if let Some(summary) = profile.summary.as_deref() {
        if !summary.is_empty() {
            parts.push(format!("Summary: {}", summary));
        }
    }

    if let Some(skills) = &profile.skills {
        let flattened = skills.flattened();
        if !flattened.is_empty() {
            parts.push(format!("Skills: {}", flattened.join(", ")));
        }
    }

    if !profile.experience.is_empty() {
        let entries: Vec<String> = profile.experience.iter().map(experience_block).collect();
        parts.push(format!("Experience:\n{}", entries.join("\n\n")));
    }

    if !profile.education.is_empty() {
        let entries: Vec<String> = profile
            .education
            .iter()
            .map(|edu| format!("{}, {}", edu.degree, edu.school))
            .collect();
        parts.push(format!("Education:\n{}", entries.join("\n")));
    }

    if !profile.projects.is_empty() {
        let entries: Vec<String> = profile
            .projects
            .iter()
            .map(|project| {
                let mut block = project.title.clone();
                if let Some(desc) = project.description.as_deref() {
                    if !desc.is_empty() {
                        block.push_str(&format!(": {}", desc));
                    }
                }
                if !project.technologies.is_empty() {
                    block.push_str(&format!(
                        "\nTechnologies: {}",
                        project.technologies.join(", ")
                    ));
                }
                block
            })
            .collect();
        parts.push(format!("Projects:\n{}", entries.join("\n\n")));
    }

    if !profile.certifications.is_empty() {
        let entries: Vec<String> = profile
            .certifications
            .iter()
            .map(|cert| format!("{} ({})", cert.title, cert.issuer))
            .collect();
        parts.push(format!("Certifications: {}", entries.join("; ")));
    }

    if !profile.languages.is_empty() {
        let entries: Vec<String> = profile
            .languages
            .iter()
            .map(|lang| format!("{} ({})", lang.language, lang.proficiency))
            .collect();
        parts.push(format!("Languages: {}", entries.join(", ")));
    }

    if !profile.achievements.is_empty() {
        parts.push(format!("Achievements: {}", profile.achievements.join("; ")));
    }

    parts.join("\n\n")
}

fn experience_block(exp: &ExperienceEntry) -> String {
    let end = if exp.is_current {
        "Present"
    } else {
        exp.end_date.as_deref().unwrap_or("Present")
    };
    let mut block = format!(
        "{} at {} ({} - {})",
        exp.position,
        exp.company,
        exp.start_date.as_deref().unwrap_or("unknown"),
        end
    );
    if let Some(desc) = exp.description.as_deref() {
        if !desc.is_empty() {
            block.push_str(&format!("\n{}", desc));
        }
    }
    if !exp.achievements.is_empty() {
        block.push_str(&format!("\nAchievements: {}", exp.achievements.join("; ")));
    }
    if !exp.technologies.is_empty() {
        block.push_str(&format!("\nTechnologies: {}", exp.technologies.join(", ")));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{PersonalInfo, SkillSet};

    #[test]
    fn job_text_includes_only_present_sections() {
        let job: SourceJob = serde_json::from_value(serde_json::json!({
            "id": 1,
            "job_title": "Platform Engineer",
            "company": "Acme",
            "description": "Own the deploy pipeline",
            "technology_slugs": ["rust", "kubernetes"]
        }))
        .unwrap();

        let text = job_embedding_text(&job);
        assert_eq!(
            text,
            "Title: Platform Engineer\n\nCompany: Acme\n\nDescription:\nOwn the deploy pipeline\n\nTechnologies: rust, kubernetes"
        );
    }

    #[test]
    fn job_text_skips_empty_description_and_slugs() {
        let job: SourceJob = serde_json::from_value(serde_json::json!({
            "id": 2,
            "job_title": "QA",
            "company": "Beta",
            "description": ""
        }))
        .unwrap();

        assert_eq!(job_embedding_text(&job), "Title: QA\n\nCompany: Beta");
    }

    #[test]
    fn profile_text_orders_labeled_sections() {
        let profile = UserProfile {
            personal_info: Some(PersonalInfo {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                ..Default::default()
            }),
            summary: Some("Systems engineer".into()),
            skills: Some(SkillSet {
                languages: vec!["Rust".into()],
                ..Default::default()
            }),
            experience: vec![ExperienceEntry {
                company: "Analytical Engines".into(),
                position: "Engineer".into(),
                start_date: Some("2021-02".into()),
                is_current: true,
                technologies: vec!["Rust".into()],
                ..Default::default()
            }],
            ..Default::default()
        };

        let text = profile_embedding_text(&profile);
        assert!(text.starts_with("Name: Ada Lovelace\n\nSummary: Systems engineer"));
        assert!(text.contains("Skills: Rust"));
        assert!(text.contains("Engineer at Analytical Engines (2021-02 - Present)"));
        assert!(text.contains("Technologies: Rust"));
    }

    #[test]
    fn empty_profile_produces_empty_text() {
        assert_eq!(profile_embedding_text(&UserProfile::default()), "");
    }
}
