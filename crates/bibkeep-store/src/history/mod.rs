//! Versioned history of bibliography documents
//!
//! Provides:
//! - The persisted commit graph (`Tracker`) and its on-disk layout
//! - `HistoryStore`: init, commit, undo, redo, checkout, comment, history, log, show, delete
//! - Plain-text renderers for history reports

pub mod ids;
pub mod layout;
pub mod report;
mod store;
pub mod tracker;

pub use layout::{document_name, HistoryLayout};
pub use report::{render_rows, HistoryReport, HistoryRow};
pub use store::{CommitOutcome, DeleteOutcome, HistoryStore, InitOutcome, Navigation};
pub use tracker::Tracker;
