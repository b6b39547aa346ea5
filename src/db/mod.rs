pub mod jobs;
pub mod runs;
pub mod similarity;
pub mod store;
pub mod user_jobs;
pub mod users;
