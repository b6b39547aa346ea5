pub mod batching;
pub mod cron;
pub mod embedding_text;
pub mod http_client;
pub mod logging;
pub mod scores;
