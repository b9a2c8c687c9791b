//! Document store facade
//!
//! Composes the codec and the history store for front ends. Every public
//! operation owns its lifecycle events:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (history, fs, codec) use only `tracing::debug!()`. Nothing is
//! cached: each call re-reads what it needs from disk.

#![allow(clippy::result_large_err)]

use crate::config::StoreConfig;
use crate::errors::{file_not_found, io_error_at, Result};
use crate::fs::atomic_write;
use crate::history::{
    document_name, CommitOutcome, DeleteOutcome, HistoryReport, HistoryRow, HistoryStore,
    InitOutcome, Navigation,
};
use bibkeep_core::codec::{decode, encode};
use bibkeep_core::errors::ExError;
use bibkeep_core::model::Document;
use bibkeep_core::{log_op_end, log_op_error, log_op_start};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const BIB_EXTENSION: &str = "bib";

pub struct DocumentStore {
    config: StoreConfig,
    history: HistoryStore,
}

impl DocumentStore {
    pub fn new(config: StoreConfig) -> Self {
        let history = HistoryStore::new(config.history_root_path(), config.encode_options());
        Self { config, history }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn history_store(&self) -> &HistoryStore {
        &self.history
    }

    /// Decode a working file
    ///
    /// Relative paths are taken from the configured working directory.
    pub fn load(&self, path: &Path) -> Result<Document> {
        let path = self.config.resolve_document(path);
        observe("store_load", &path, || self.load_impl(&path))
    }

    /// Atomically rewrite the document's working file
    ///
    /// The document path is used as is; documents from [`Self::load`]
    /// already carry their resolved path.
    pub fn save(&self, document: &Document) -> Result<()> {
        let path = &document.path;
        observe("store_save", path, || {
            atomic_write(path, self.render(document).as_bytes())
        })
    }

    /// Text the document would be saved as
    pub fn render(&self, document: &Document) -> String {
        encode(document, &self.config.encode_options())
    }

    /// Start tracking a working file
    pub fn init(&self, path: &Path) -> Result<InitOutcome> {
        let path = self.config.resolve_document(path);
        observe("store_init", &path, || {
            let document = self.load_impl(&path)?;
            self.history.init(&document)
        })
    }

    /// Record a document, initialising its history when untracked
    ///
    /// Like [`Self::save`], the document path is used as is.
    pub fn commit(&self, document: &Document, comment: Option<&str>) -> Result<CommitOutcome> {
        observe_commit("store_commit", document, || {
            self.history.commit(document, comment)
        })
    }

    /// Commit the document and rewrite its working file canonically
    ///
    /// The working file is only written once the commit holds the lock, so a
    /// failed commit leaves it as it was.
    pub fn save_and_commit(
        &self,
        document: &Document,
        comment: Option<&str>,
    ) -> Result<CommitOutcome> {
        observe_commit("store_save_commit", document, || {
            self.history.commit_and_save(document, comment)
        })
    }

    /// Load the working file and commit it
    pub fn commit_file(&self, path: &Path, comment: Option<&str>) -> Result<CommitOutcome> {
        let document = self.load(path)?;
        self.commit(&document, comment)
    }

    pub fn undo(&self, path: &Path, steps: usize) -> Result<Navigation> {
        let path = self.config.resolve_document(path);
        observe("store_undo", &path, || self.history.undo(&path, steps))
    }

    pub fn redo(&self, path: &Path, steps: usize) -> Result<Navigation> {
        let path = self.config.resolve_document(path);
        observe("store_redo", &path, || self.history.redo(&path, steps))
    }

    pub fn checkout(&self, path: &Path, commit_id: &str) -> Result<Navigation> {
        let path = self.config.resolve_document(path);
        observe("store_checkout", &path, || self.history.checkout(&path, commit_id))
    }

    pub fn comment(&self, path: &Path, commit_id: &str, text: &str) -> Result<()> {
        let path = self.config.resolve_document(path);
        observe("store_comment", &path, || {
            self.history.comment(&path, commit_id, text)
        })
    }

    pub fn history(&self, path: &Path) -> Result<HistoryReport> {
        let path = self.config.resolve_document(path);
        observe("store_history", &path, || self.history.history(&path))
    }

    pub fn log(&self, path: &Path) -> Result<Vec<HistoryRow>> {
        let path = self.config.resolve_document(path);
        observe("store_log", &path, || self.history.log(&path))
    }

    pub fn show(&self, path: &Path, commit_id: &str) -> Result<Document> {
        let path = self.config.resolve_document(path);
        observe("store_show", &path, || self.history.show(&path, commit_id))
    }

    pub fn delete(&self, path: &Path) -> Result<DeleteOutcome> {
        let path = self.config.resolve_document(path);
        observe("store_delete", &path, || self.history.delete(&path))
    }

    /// Bibliography files (`*.bib`) in the working directory, sorted by name
    pub fn list_documents(&self) -> Result<Vec<PathBuf>> {
        let dir = &self.config.working_dir;
        log_op_start!("store_list", working_dir = %dir.display());
        let start = Instant::now();

        let result = list_bib_files(dir).map_err(|e| {
            log_op_error!(
                "store_list",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "store_list",
            duration_ms = start.elapsed().as_millis() as u64,
            item_count = result.len()
        );
        Ok(result)
    }

    fn load_impl(&self, path: &Path) -> Result<Document> {
        if !path.exists() {
            return Err(file_not_found("store_load", path));
        }
        let text = fs::read_to_string(path).map_err(|e| io_error_at("store_load", path, e))?;
        let mut document = decode(&text, self.config.collapse_newlines).map_err(|e| {
            let name = document_name(path).unwrap_or_else(|_| path.display().to_string());
            ExError::from(e).with_op("store_load").with_document(name)
        })?;
        document.path = path.to_path_buf();
        Ok(document)
    }
}

/// Commit variant of [`observe`]; the end event carries the commit id
fn observe_commit(
    op: &'static str,
    document: &Document,
    run: impl FnOnce() -> Result<CommitOutcome>,
) -> Result<CommitOutcome> {
    log_op_start!(op, document = %document.path.display());
    let start = Instant::now();

    let outcome = run().map_err(|e| {
        log_op_error!(op, e.clone(), duration_ms = start.elapsed().as_millis() as u64);
        e
    })?;

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        commit_id = outcome.commit_id()
    );
    Ok(outcome)
}

/// Run one facade operation between its start and end events
fn observe<T>(op: &'static str, path: &Path, run: impl FnOnce() -> Result<T>) -> Result<T> {
    log_op_start!(op, document = %path.display());
    let start = Instant::now();

    let result = run().map_err(|e| {
        log_op_error!(op, e.clone(), duration_ms = start.elapsed().as_millis() as u64);
        e
    })?;

    log_op_end!(op, duration_ms = start.elapsed().as_millis() as u64);
    Ok(result)
}

fn list_bib_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| io_error_at("store_list", dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error_at("store_list", dir, e))?;
        let path = entry.path();
        let is_bib = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == BIB_EXTENSION);
        if is_bib && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
