use deadpool_redis::Connection;
use serde_json::Value;

use crate::models::events::{AppEvent, EventType};
use crate::state::AppState;
use crate::workers::redis_event_worker::STREAM_NAME;

pub async fn publish_event(
    conn: &mut Connection,
    stream: &str,
    event: &AppEvent,
) -> redis::RedisResult<()> {
    let event_json = serde_json::to_string(event).unwrap();

    redis::cmd("XADD")
        .arg(stream)
        .arg("*")
        .arg("event")
        .arg(event_json)
        .query_async(conn)
        .await
}

/// Wraps a payload in an `AppEvent` envelope and puts it on the app stream.
pub async fn publish_app_event(
    state: &AppState,
    event_type: EventType,
    payload: Value,
) -> anyhow::Result<()> {
    let event = AppEvent::new(event_type, payload);
    let mut conn = state.redis_pool.get().await?;
    publish_event(&mut conn, STREAM_NAME, &event).await?;
    Ok(())
}
