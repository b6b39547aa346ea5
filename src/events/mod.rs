pub mod consumer;
pub mod handler;
pub mod publisher;
pub mod utils;
