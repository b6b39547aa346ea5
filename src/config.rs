use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::{env, process};
use tracing::error;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpConfig {
    pub address: String,
    pub port: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DbConfig {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub x_api_key: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    pub search_throttle_secs: u64,
    pub embedding_ttl_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobSchedule {
    pub seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CronConfig {
    pub refresh_matches: JobSchedule,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GcpConfig {
    pub model: String,
    pub auth_token: String,
    pub dimensions: usize,
    pub batch_size: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TheirStackConfig {
    pub base_url: String,
    pub api_key: String,
    pub posted_max_age_days: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatchingConfig {
    pub step_attempts: u32,
    pub retry_backoff_ms: u64,
    pub similarity_chunk_size: usize,
    pub stale_run_secs: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub debug: bool,
    pub http: HttpConfig,
    pub redis: RedisConfig,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub cron: CronConfig,
    pub gcp: GcpConfig,
    pub theirstack: TheirStackConfig,
    pub matching: MatchingConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().collect();
        if args.len() < 2 {
            error!("❌ Error: Configuration path not provided. Usage: cargo run -- <config_path>");
            process::exit(1);
        }
        let config_path = &args[1];

        let config = Config::builder()
            .add_source(File::with_name(config_path))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }
}
