pub mod embeddings;
pub mod fingerprint;
pub mod job_source;
pub mod jobs;
pub mod matching;
pub mod profiles;
pub mod reasons;
pub mod search;
pub mod seniority;
