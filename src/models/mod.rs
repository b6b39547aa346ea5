pub mod events;
pub mod job;
pub mod preferences;
pub mod profile;
