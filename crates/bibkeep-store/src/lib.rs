//! bibkeep store: working files and their versioned history
//!
//! Provides:
//! - Atomic file writes and the per-document advisory lock
//! - The commit-graph history store (init, commit, undo, redo, checkout, ...)
//! - `DocumentStore`, the load/save/commit facade used by front ends
//! - `StoreConfig`, the JSON-backed configuration

pub mod config;
pub mod errors;
pub mod facade;
pub mod fs;
pub mod history;

// Re-export key types
pub use config::StoreConfig;
pub use errors::Result;
pub use facade::DocumentStore;
pub use history::{
    CommitOutcome, DeleteOutcome, HistoryReport, HistoryRow, HistoryStore, InitOutcome,
    Navigation,
};
