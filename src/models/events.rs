use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppEvent {
    pub id: Uuid,
    pub event_type: EventType,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl AppEvent {
    pub fn new(event_type: EventType, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            payload,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "jobs.search.requested")]
    JobsSearchRequested,
    #[serde(rename = "profile.updated")]
    ProfileUpdated,
}

/// Payload carried by both search triggers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchRequested {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_uses_dotted_names() {
        assert_eq!(
            serde_json::to_string(&EventType::JobsSearchRequested).unwrap(),
            "\"jobs.search.requested\""
        );
        let parsed: EventType = serde_json::from_str("\"profile.updated\"").unwrap();
        assert_eq!(parsed, EventType::ProfileUpdated);
    }

    #[test]
    fn app_event_round_trips_through_json() {
        let event = AppEvent::new(
            EventType::JobsSearchRequested,
            serde_json::json!({ "user_id": Uuid::new_v4() }),
        );
        let raw = serde_json::to_string(&event).unwrap();
        let parsed: AppEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.id, event.id);
        assert_eq!(parsed.event_type, EventType::JobsSearchRequested);
    }
}
