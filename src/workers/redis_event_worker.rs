use deadpool_redis::Connection;
use redis::{
    cmd,
    streams::{StreamAutoClaimReply, StreamReadReply},
    RedisResult,
};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::db;
use crate::db::runs::RunStatus;
use crate::events::consumer::ensure_consumer_group;
use crate::events::handler::handle_event;
use crate::events::publisher::publish_app_event;
use crate::models::events::{AppEvent, EventType, SearchRequested};
use crate::state::AppState;

pub const STREAM_NAME: &str = "app_events";
const GROUP_NAME: &str = "matcher_group";
const CONSUMER_NAME: &str = "worker_1";

pub async fn start(state: Arc<AppState>) {
    info!("Starting Redis Event Worker...");

    if let Err(e) = requeue_stale_runs(&state).await {
        error!("❌ Stale run sweep failed: {:?}", e);
    }

    loop {
        if let Err(e) = run_worker(state.clone()).await {
            error!("Redis worker crashed: {:?}", e);
            sleep(Duration::from_secs(3)).await;
        }
    }
}

/// Runs stuck in `running` from before a crash or restart are marked failed
/// and their users get a fresh trigger. The pipeline's idempotent writes
/// make the re-run safe.
async fn requeue_stale_runs(state: &Arc<AppState>) -> anyhow::Result<()> {
    let stale = db::runs::stale_running_runs(
        &state.db_pool,
        state.config.matching.stale_run_secs,
    )
    .await?;

    for run in stale {
        warn!(
            "🧹 Run {} for user {} went stale, superseding and requeueing",
            run.id, run.user_id
        );

        db::runs::finish_run(
            &state.db_pool,
            run.id,
            RunStatus::Failed,
            None,
            Some("superseded"),
        )
        .await?;

        let payload = serde_json::to_value(SearchRequested {
            user_id: run.user_id,
        })?;
        publish_app_event(state, EventType::JobsSearchRequested, payload).await?;
    }

    Ok(())
}

async fn run_worker(state: Arc<AppState>) -> RedisResult<()> {
    let mut conn: Connection = state.redis_pool.get().await.map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::IoError,
            "deadpool get failed",
            e.to_string(),
        ))
    })?;

    ensure_consumer_group(&mut conn, STREAM_NAME, GROUP_NAME).await?;
    reclaim_pending(&state, &mut conn).await?;

    info!("Redis worker listening on stream '{}'", STREAM_NAME);

    loop {
        process_stream(&state).await?;
    }
}

/// Claims and replays entries a previous worker read but never acked, so a
/// trigger lost to a crash mid-handling is not stranded in the pending list.
async fn reclaim_pending(state: &Arc<AppState>, conn: &mut Connection) -> RedisResult<()> {
    let mut cursor = "0-0".to_string();

    loop {
        let reply: StreamAutoClaimReply = cmd("XAUTOCLAIM")
            .arg(STREAM_NAME)
            .arg(GROUP_NAME)
            .arg(CONSUMER_NAME)
            .arg(0)
            .arg(&cursor)
            .query_async(conn)
            .await?;

        for message in reply.claimed {
            match parse_event(&message.map) {
                Some(event) => {
                    if let Err(e) = handle_event(state, event).await {
                        error!("Failed to handle reclaimed event: {:?}", e);
                        continue;
                    }
                    ack_message(conn, &message.id).await?;
                }
                None => {
                    warn!("Skipping undecodable reclaimed entry {}", message.id);
                    ack_message(conn, &message.id).await?;
                }
            }
        }

        if reply.next_stream_id == "0-0" {
            break;
        }
        cursor = reply.next_stream_id;
    }

    Ok(())
}

async fn process_stream(state: &Arc<AppState>) -> RedisResult<()> {
    let mut conn: Connection = state.redis_pool.get().await.map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::IoError,
            "deadpool get failed",
            e.to_string(),
        ))
    })?;

    let reply: StreamReadReply = cmd("XREADGROUP")
        .arg("GROUP")
        .arg(GROUP_NAME)
        .arg(CONSUMER_NAME)
        .arg("COUNT")
        .arg(10)
        .arg("BLOCK")
        .arg(5000)
        .arg("STREAMS")
        .arg(STREAM_NAME)
        .arg(">")
        .query_async(&mut conn)
        .await?;

    for stream in reply.keys {
        for message in stream.ids {
            if let Some(event) = parse_event(&message.map) {
                // A failed handler leaves the entry unacked so a later
                // delivery retries the run.
                if let Err(e) = handle_event(state, event).await {
                    error!("Failed to handle event: {:?}", e);
                } else {
                    ack_message(&mut conn, &message.id).await?;
                }
            } else {
                warn!("Skipping undecodable stream entry {}", message.id);
                ack_message(&mut conn, &message.id).await?;
            }
        }
    }

    Ok(())
}

fn parse_event(map: &std::collections::HashMap<String, redis::Value>) -> Option<AppEvent> {
    let value = map.get("event")?;
    let json_str: String = redis::from_redis_value(value).ok()?;
    serde_json::from_str(&json_str).ok()
}

async fn ack_message(conn: &mut Connection, message_id: &str) -> RedisResult<()> {
    cmd("XACK")
        .arg(STREAM_NAME)
        .arg(GROUP_NAME)
        .arg(message_id)
        .query_async::<()>(conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::EventType;
    use std::collections::HashMap;
    use uuid::Uuid;

    #[test]
    fn decodes_stream_entries_into_events() {
        let event = AppEvent::new(
            EventType::JobsSearchRequested,
            serde_json::json!({ "user_id": Uuid::new_v4() }),
        );
        let mut map = HashMap::new();
        map.insert(
            "event".to_string(),
            redis::Value::BulkString(serde_json::to_vec(&event).unwrap()),
        );

        let parsed = parse_event(&map).unwrap();
        assert_eq!(parsed.id, event.id);
        assert_eq!(parsed.event_type, EventType::JobsSearchRequested);
    }

    #[test]
    fn undecodable_entries_come_back_as_none() {
        assert!(parse_event(&HashMap::new()).is_none());

        let mut garbage = HashMap::new();
        garbage.insert(
            "event".to_string(),
            redis::Value::BulkString(b"not json".to_vec()),
        );
        assert!(parse_event(&garbage).is_none());
    }
}
