use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::preferences::JobPreference;

/// The preference fields that define a search. Timestamps and ids stay out
/// so an untouched preference row keeps producing the same fingerprint run
/// after run.
#[derive(Serialize)]
struct FingerprintFields<'a> {
    role: &'a [String],
    job_type: &'a str,
    work_mode: &'a str,
    location: &'a [String],
}

/// Stable hex fingerprint of a user's job preferences. Matches are grouped
/// under this value, which is what lets a later run with unchanged
/// preferences backfill earlier results.
pub fn preference_fingerprint(prefs: &JobPreference) -> String {
    let fields = FingerprintFields {
        role: &prefs.role,
        job_type: prefs.job_type.as_str(),
        work_mode: prefs.work_mode.as_str(),
        location: &prefs.location,
    };

    let input = serde_json::to_string(&fields).expect("preference fields are always serializable");
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}
