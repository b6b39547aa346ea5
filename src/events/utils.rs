use anyhow::{anyhow, Result};
use tracing::error;
use uuid::Uuid;

use crate::models::events::AppEvent;

pub fn extract_user_id(event: &AppEvent) -> Result<Uuid> {
    match event
        .payload
        .get("user_id")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
    {
        Some(user_id) => Ok(user_id),
        None => {
            error!(
                event_id = %event.id,
                "❌ Missing or invalid user_id in event payload"
            );
            Err(anyhow!("Missing or invalid user_id in event payload"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::EventType;

    #[test]
    fn extracts_a_valid_user_id() {
        let user_id = Uuid::new_v4();
        let event = AppEvent::new(
            EventType::JobsSearchRequested,
            serde_json::json!({ "user_id": user_id }),
        );
        assert_eq!(extract_user_id(&event).unwrap(), user_id);
    }

    #[test]
    fn rejects_missing_or_garbage_ids() {
        let missing = AppEvent::new(EventType::JobsSearchRequested, serde_json::json!({}));
        assert!(extract_user_id(&missing).is_err());

        let garbage = AppEvent::new(
            EventType::JobsSearchRequested,
            serde_json::json!({ "user_id": "not-a-uuid" }),
        );
        assert!(extract_user_id(&garbage).is_err());
    }
}
