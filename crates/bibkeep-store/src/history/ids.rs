//! Commit identifiers
//!
//! Ids are random tokens, not content digests: 32 lowercase hex characters
//! taken from a v4 UUID. A candidate is only accepted once it is known not
//! to name an existing commit or file.

#![allow(clippy::result_large_err)]

use super::tracker::Tracker;
use crate::errors::{id_collision, Result};
use std::path::Path;
use uuid::Uuid;

/// Candidates tried before giving up
pub const MAX_ID_ATTEMPTS: usize = 8;

pub fn random_commit_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Draw ids until one is unused by `tracker` and by files in `history_dir`
pub fn fresh_commit_id(
    document: &str,
    tracker: Option<&Tracker>,
    history_dir: &Path,
) -> Result<String> {
    fresh_commit_id_with(document, tracker, history_dir, random_commit_id)
}

pub(crate) fn fresh_commit_id_with<F>(
    document: &str,
    tracker: Option<&Tracker>,
    history_dir: &Path,
    mut generate: F,
) -> Result<String>
where
    F: FnMut() -> String,
{
    for _ in 0..MAX_ID_ATTEMPTS {
        let candidate = generate();
        let known = tracker.is_some_and(|t| t.contains(&candidate));
        if known || history_dir.join(&candidate).exists() {
            tracing::debug!(document, candidate = %candidate, "commit id already in use, drawing again");
            continue;
        }
        return Ok(candidate);
    }
    Err(id_collision(document, MAX_ID_ATTEMPTS))
}
