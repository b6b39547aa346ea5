use serde::{Deserialize, Serialize};

/// Structured resume profile as extracted by the resume parser and stored in
/// `users.profile`. Every field is optional on the wire so partially parsed
/// resumes still load; validation decides what is acceptable to save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    pub personal_info: Option<PersonalInfo>,
    pub socials: Vec<SocialLink>,
    pub summary: Option<String>,
    pub skills: Option<SkillSet>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub languages: Vec<LanguageEntry>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<ProfileLocation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
    pub username: Option<String>,
}

/// Skills grouped by category. The matcher flattens these into one list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillSet {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub ml_and_ai: Vec<String>,
    pub devops: Vec<String>,
    pub databases: Vec<String>,
    pub tools: Vec<String>,
    pub other: Vec<String>,
}

impl SkillSet {
    pub fn flattened(&self) -> Vec<String> {
        self.languages
            .iter()
            .chain(&self.frameworks)
            .chain(&self.ml_and_ai)
            .chain(&self.devops)
            .chain(&self.databases)
            .chain(&self.tools)
            .chain(&self.other)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    pub location: Option<String>,
    /// "YYYY-MM"
    pub start_date: Option<String>,
    /// "YYYY-MM", absent while the role is ongoing
    pub end_date: Option<String>,
    pub is_current: bool,
    pub description: Option<String>,
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    pub degree: String,
    pub school: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub cgpa_or_percentage: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectEntry {
    pub title: String,
    pub description: Option<String>,
    pub highlights: Vec<String>,
    pub technologies: Vec<String>,
    pub links: Vec<ProjectLink>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectLink {
    #[serde(rename = "type")]
    pub link_type: String,
    pub url: String,
    pub stars: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificationEntry {
    pub title: String,
    pub issuer: String,
    pub issue_date: Option<String>,
    pub expiry_date: Option<String>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageEntry {
    pub language: String,
    pub proficiency: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_profile() {
        let raw = serde_json::json!({
            "personalInfo": {
                "name": "Ada Lovelace",
                "email": "ada@example.com"
            },
            "skills": {
                "languages": ["Rust"],
                "mlAndAi": ["PyTorch"]
            },
            "experience": [{
                "company": "Analytical Engines",
                "position": "Engineer",
                "startDate": "2021-02",
                "isCurrent": true
            }]
        });

        let profile: UserProfile = serde_json::from_value(raw).unwrap();
        assert_eq!(profile.personal_info.unwrap().name, "Ada Lovelace");
        let skills = profile.skills.unwrap();
        assert_eq!(skills.ml_and_ai, vec!["PyTorch"]);
        assert!(profile.experience[0].is_current);
        assert_eq!(profile.experience[0].start_date.as_deref(), Some("2021-02"));
    }

    #[test]
    fn flattens_skill_categories_in_order() {
        let skills = SkillSet {
            languages: vec!["rust".into()],
            frameworks: vec!["axum".into()],
            databases: vec!["postgres".into()],
            ..Default::default()
        };
        assert_eq!(skills.flattened(), vec!["rust", "axum", "postgres"]);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(profile.personal_info.is_none());
        assert!(profile.experience.is_empty());
        assert!(profile.achievements.is_empty());
    }
}
