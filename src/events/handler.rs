use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::events::utils::extract_user_id;
use crate::models::events::{AppEvent, EventType};
use crate::services::matching::run_search;
use crate::state::AppState;

/// Dispatches one stream event. Both event types end in a search run: a
/// fresh trigger wants new matches, and a profile update changed the
/// embedding every score depends on.
pub async fn handle_event(state: &Arc<AppState>, event: AppEvent) -> anyhow::Result<()> {
    info!("📨 Handling event {:?} ({})", event.event_type, event.id);

    match event.event_type {
        EventType::JobsSearchRequested | EventType::ProfileUpdated => {
            let user_id = extract_user_id(&event)?;
            run_search_guarded(state, user_id).await
        }
    }
}

/// Runs the pipeline unless this process already has a run in flight for
/// the user. Duplicate triggers are dropped, not queued; the idempotent
/// pipeline makes a dropped re-trigger harmless.
async fn run_search_guarded(state: &Arc<AppState>, user_id: uuid::Uuid) -> anyhow::Result<()> {
    let running = &state.shared_state.running_searches;

    if running.contains_key(&user_id) {
        warn!("⏭️ Search already running for user {}, skipping", user_id);
        return Ok(());
    }

    running.insert(user_id, Instant::now());
    let result = run_search(&state.matching, user_id).await;
    running.remove(&user_id);

    result.map(|_| ())
}
