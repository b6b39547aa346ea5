use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "job_type", rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "work_mode", rename_all = "kebab-case")]
pub enum WorkMode {
    OnSite,
    Remote,
    Hybrid,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::OnSite => "on-site",
            WorkMode::Remote => "remote",
            WorkMode::Hybrid => "hybrid",
        }
    }
}

/// Lifecycle of a matched job from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_job_status", rename_all = "lowercase")]
pub enum UserJobStatus {
    New,
    Viewed,
    Saved,
    Applied,
    Hidden,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobPreference {
    pub user_id: Uuid,
    pub role: Vec<String>,
    pub job_type: JobType,
    pub work_mode: WorkMode,
    pub location: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_type_uses_kebab_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&JobType::FullTime).unwrap(),
            "\"full-time\""
        );
        let parsed: JobType = serde_json::from_str("\"part-time\"").unwrap();
        assert_eq!(parsed, JobType::PartTime);
    }

    #[test]
    fn work_mode_round_trips() {
        let parsed: WorkMode = serde_json::from_str("\"on-site\"").unwrap();
        assert_eq!(parsed, WorkMode::OnSite);
        assert_eq!(parsed.as_str(), "on-site");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserJobStatus::Applied).unwrap(),
            "\"applied\""
        );
    }
}
