use std::sync::Arc;

use tracing::{error, info};

use crate::db;
use crate::events::publisher::publish_app_event;
use crate::models::events::{EventType, SearchRequested};
use crate::state::AppState;

/// Queues a search run for every user who is ready to be matched. The runs
/// themselves happen on the event worker, one user at a time.
pub async fn run(state: Arc<AppState>) {
    info!(target: "cron", "╔════════════════════════════════════════════╗");
    info!(target: "cron", "║   🔄 Starting refresh matches cron.        ║");
    info!(target: "cron", "╚════════════════════════════════════════════╝");

    let users = match db::users::users_ready_for_matching(&state.db_pool).await {
        Ok(users) => users,
        Err(e) => {
            error!(target: "cron", "❌ Failed to list matchable users: {:?}", e);
            return;
        }
    };

    info!(target: "cron", "👥 {} users ready for matching", users.len());

    let mut queued = 0usize;
    for user_id in users {
        let payload = match serde_json::to_value(SearchRequested { user_id }) {
            Ok(payload) => payload,
            Err(e) => {
                error!(target: "cron", "❌ Failed to encode trigger for {}: {:?}", user_id, e);
                continue;
            }
        };

        match publish_app_event(&state, EventType::JobsSearchRequested, payload).await {
            Ok(()) => queued += 1,
            Err(e) => {
                error!(target: "cron", "❌ Failed to queue search for {}: {:?}", user_id, e)
            }
        }
    }

    info!(target: "cron", "✅ Queued {} search runs", queued);
}
