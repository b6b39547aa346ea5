pub mod config;
pub mod cron;
pub mod db;
pub mod events;
pub mod http;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod workers;
