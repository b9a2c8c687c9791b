//! Error handling for bibkeep-store
//!
//! Wraps bibkeep-core ExError with store-specific helpers

use bibkeep_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error that names the file involved
pub fn io_error_at(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(format!("{}: {}", path.display(), err))
}

/// Create a missing working file error
pub fn file_not_found(operation: &str, path: &Path) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(operation.to_string())
        .with_message(format!("{} does not exist", path.display()))
}

/// Create a tracker (de)serialization error
pub fn serialization_error(document: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("tracker_json")
        .with_document(document)
        .with_message(err.to_string())
}

/// Create a corrupt tracker error
pub fn corrupt_tracker(document: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::CorruptTracker)
        .with_op("tracker_load")
        .with_document(document)
        .with_message(reason.to_string())
}

/// Create a lock-busy error
pub fn lock_busy(document: &str, lock_path: &Path) -> ExError {
    ExError::new(ExErrorKind::Concurrency)
        .with_op("history_lock")
        .with_document(document)
        .with_message(format!(
            "history is locked by another process: {}",
            lock_path.display()
        ))
}

/// Create an id collision error after exhausting retries
pub fn id_collision(document: &str, attempts: usize) -> ExError {
    ExError::new(ExErrorKind::IdCollision)
        .with_op("commit_id")
        .with_document(document)
        .with_message(format!(
            "no unused commit id after {} attempts",
            attempts
        ))
}

/// Create an invalid input error
pub fn invalid_input(operation: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op(operation.to_string())
        .with_message(reason.to_string())
}
