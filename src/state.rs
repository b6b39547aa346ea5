use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::services::matching::MatchingDeps;
use deadpool_redis::Pool;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub shared_state: SharedState,
    pub redis_pool: Pool,
    pub db_pool: PgPool,
    pub matching: Arc<MatchingDeps>,
}

/// In-process view of which users have a search run in flight. The event
/// handler consults it to drop duplicate triggers for the same user.
#[derive(Clone, Default)]
pub struct SharedState {
    pub running_searches: Arc<DashMap<Uuid, Instant>>,
}
