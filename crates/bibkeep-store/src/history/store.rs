//! Per-document commit graph on disk
//!
//! Each mutating operation takes the document lock, loads and validates the
//! tracker, and writes in dependency order: snapshot files first, then the
//! working file, then the tracker that points at them. A crash between
//! steps leaves at worst an unreferenced snapshot behind.

#![allow(clippy::result_large_err)]

use super::ids::fresh_commit_id;
use super::layout::{document_name, HistoryLayout};
use super::report::{log_rows, HistoryReport, HistoryRow};
use super::tracker::Tracker;
use crate::errors::{corrupt_tracker, io_error_at, serialization_error, Result};
use crate::fs::{atomic_write, DocumentLock};
use bibkeep_core::codec::{decode, encode, EncodeOptions};
use bibkeep_core::errors::{ExError, HistoryStateError};
use bibkeep_core::model::Document;
use chrono::{Local, SecondsFormat};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of [`HistoryStore::init`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Initialized { commit_id: String },
    AlreadyTracked { current: String },
}

/// Result of [`HistoryStore::commit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The document was untracked; its root commit was created
    Initialized { commit_id: String },
    /// Content equals the snapshot at `current`
    NoChanges { current: String },
    Committed {
        commit_id: String,
        parent: String,
        /// `parent` already had children, so this commit starts a new branch
        branched: bool,
    },
}

impl CommitOutcome {
    /// The commit `current` points at afterwards
    pub fn commit_id(&self) -> &str {
        match self {
            CommitOutcome::Initialized { commit_id } => commit_id,
            CommitOutcome::NoChanges { current } => current,
            CommitOutcome::Committed { commit_id, .. } => commit_id,
        }
    }
}

/// Result of undo, redo and checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub from: String,
    pub to: String,
    pub steps: usize,
}

/// Result of [`HistoryStore::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NothingToDelete,
}

fn now_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// History operations for every document under one history root
#[derive(Debug, Clone)]
pub struct HistoryStore {
    layout: HistoryLayout,
    options: EncodeOptions,
}

impl HistoryStore {
    /// Snapshots are encoded with `options` and decoded with its
    /// `collapse_newlines` flag.
    pub fn new(history_root: impl Into<PathBuf>, options: EncodeOptions) -> Self {
        Self {
            layout: HistoryLayout::new(history_root),
            options,
        }
    }

    pub fn layout(&self) -> &HistoryLayout {
        &self.layout
    }

    pub fn is_tracked(&self, working_path: &Path) -> bool {
        document_name(working_path)
            .map(|name| self.layout.tracker_path(&name).exists())
            .unwrap_or(false)
    }

    /// Create the tracker and root commit if the document has none
    pub fn init(&self, document: &Document) -> Result<InitOutcome> {
        let name = document_name(&document.path)?;
        let _lock = DocumentLock::acquire(&self.layout.lock_path(&name), &name)?;

        if let Some(tracker) = self.read_tracker(&name)? {
            return Ok(InitOutcome::AlreadyTracked {
                current: tracker.current,
            });
        }
        let commit_id = self.create_root(&name, document, None, WorkingFile::Keep)?;
        Ok(InitOutcome::Initialized { commit_id })
    }

    /// Record the document as a child of `current` if its content changed
    ///
    /// An untracked document is initialised instead.
    pub fn commit(&self, document: &Document, comment: Option<&str>) -> Result<CommitOutcome> {
        self.record(document, comment, WorkingFile::Keep)
    }

    /// Like [`Self::commit`], and also rewrite the working file canonically
    ///
    /// The working file is written under the lock, after the snapshot and
    /// before the tracker, so a refused or failed commit leaves it untouched.
    pub fn commit_and_save(
        &self,
        document: &Document,
        comment: Option<&str>,
    ) -> Result<CommitOutcome> {
        self.record(document, comment, WorkingFile::Rewrite)
    }

    /// Move `current` `steps` ancestors up and restore that snapshot
    pub fn undo(&self, working_path: &Path, steps: usize) -> Result<Navigation> {
        let name = document_name(working_path)?;
        if steps == 0 {
            return Err(state_error(&name, HistoryStateError::ZeroSteps));
        }
        let (_lock, mut tracker) = self.lock_tracked(&name)?;

        let ancestors = tracker.ancestors(&tracker.current);
        let Some(target) = ancestors.get(steps - 1).map(|id| id.to_string()) else {
            let available = ancestors.len();
            return Err(state_error(
                &name,
                HistoryStateError::UndoPastRoot {
                    requested: steps,
                    available,
                },
            ));
        };

        self.move_current(working_path, &name, &mut tracker, target, steps)
    }

    /// Follow the latest child `steps` times and restore that snapshot
    pub fn redo(&self, working_path: &Path, steps: usize) -> Result<Navigation> {
        let name = document_name(working_path)?;
        if steps == 0 {
            return Err(state_error(&name, HistoryStateError::ZeroSteps));
        }
        let (_lock, mut tracker) = self.lock_tracked(&name)?;

        let path = tracker.redo_path(&tracker.current, steps);
        if path.len() < steps {
            let available = path.len();
            return Err(state_error(
                &name,
                HistoryStateError::RedoPastTip {
                    requested: steps,
                    available,
                },
            ));
        }
        let target = path[steps - 1].to_string();

        self.move_current(working_path, &name, &mut tracker, target, steps)
    }

    /// Point `current` at any existing commit and restore its snapshot
    pub fn checkout(&self, working_path: &Path, commit_id: &str) -> Result<Navigation> {
        let name = document_name(working_path)?;
        let (_lock, mut tracker) = self.lock_tracked(&name)?;
        ensure_commit(&name, &tracker, commit_id)?;

        self.move_current(working_path, &name, &mut tracker, commit_id.to_string(), 0)
    }

    /// Attach or replace the annotation of a commit
    pub fn comment(&self, working_path: &Path, commit_id: &str, text: &str) -> Result<()> {
        let name = document_name(working_path)?;
        let (_lock, mut tracker) = self.lock_tracked(&name)?;
        ensure_commit(&name, &tracker, commit_id)?;

        tracker
            .comments
            .insert(commit_id.to_string(), text.to_string());
        self.write_tracker(&name, &tracker)
    }

    /// Full tree from the root
    pub fn history(&self, working_path: &Path) -> Result<HistoryReport> {
        let name = document_name(working_path)?;
        let tracker = self.load_tracker(working_path)?;
        Ok(HistoryReport::from_tracker(&name, &tracker))
    }

    /// Ancestor chain of `current`, current first
    pub fn log(&self, working_path: &Path) -> Result<Vec<HistoryRow>> {
        let tracker = self.load_tracker(working_path)?;
        Ok(log_rows(&tracker))
    }

    /// Decode the snapshot stored for a commit
    ///
    /// The returned document carries the working file path.
    pub fn show(&self, working_path: &Path, commit_id: &str) -> Result<Document> {
        let name = document_name(working_path)?;
        let tracker = self.load_tracker(working_path)?;
        ensure_commit(&name, &tracker, commit_id)?;

        let mut document = self.read_snapshot(&name, commit_id)?;
        document.path = working_path.to_path_buf();
        Ok(document)
    }

    /// Remove the tracker and every snapshot of the document
    pub fn delete(&self, working_path: &Path) -> Result<DeleteOutcome> {
        let name = document_name(working_path)?;
        let history_dir = self.layout.history_dir(&name);
        if !history_dir.exists() {
            return Ok(DeleteOutcome::NothingToDelete);
        }

        let lock = DocumentLock::acquire(&self.layout.lock_path(&name), &name)?;
        fs::remove_dir_all(&history_dir).map_err(|e| io_error_at("history_delete", &history_dir, e))?;
        lock.release_and_remove();
        tracing::debug!(document = %name, "deleted history");
        Ok(DeleteOutcome::Deleted)
    }

    /// Validated tracker of a tracked document
    pub fn load_tracker(&self, working_path: &Path) -> Result<Tracker> {
        let name = document_name(working_path)?;
        self.read_tracker(&name)?
            .ok_or_else(|| not_tracked(&name))
    }

    // ---- internals ----

    fn record(
        &self,
        document: &Document,
        comment: Option<&str>,
        working: WorkingFile,
    ) -> Result<CommitOutcome> {
        let name = document_name(&document.path)?;
        let _lock = DocumentLock::acquire(&self.layout.lock_path(&name), &name)?;

        let Some(mut tracker) = self.read_tracker(&name)? else {
            let commit_id = self.create_root(&name, document, comment, working)?;
            return Ok(CommitOutcome::Initialized { commit_id });
        };

        let parent = tracker.current.clone();
        let previous = self.read_snapshot(&name, &parent)?;
        if previous.same_content(document) {
            self.write_working(document, working)?;
            tracing::debug!(document = %name, current = %parent, "no changes to commit");
            return Ok(CommitOutcome::NoChanges { current: parent });
        }

        let history_dir = self.layout.history_dir(&name);
        let commit_id = fresh_commit_id(&name, Some(&tracker), &history_dir)?;
        self.write_snapshot(&name, &commit_id, document)?;
        self.write_working(document, working)?;

        let branched = tracker.add_child(&parent, &commit_id, now_timestamp());
        if let Some(text) = comment {
            tracker.comments.insert(commit_id.clone(), text.to_string());
        }
        self.write_tracker(&name, &tracker)?;

        tracing::debug!(document = %name, commit_id = %commit_id, parent = %parent, branched, "committed");
        Ok(CommitOutcome::Committed {
            commit_id,
            parent,
            branched,
        })
    }

    fn lock_tracked(&self, name: &str) -> Result<(DocumentLock, Tracker)> {
        if !self.layout.tracker_path(name).exists() {
            return Err(not_tracked(name));
        }
        let lock = DocumentLock::acquire(&self.layout.lock_path(name), name)?;
        let tracker = self.read_tracker(name)?.ok_or_else(|| not_tracked(name))?;
        Ok((lock, tracker))
    }

    fn create_root(
        &self,
        name: &str,
        document: &Document,
        comment: Option<&str>,
        working: WorkingFile,
    ) -> Result<String> {
        let history_dir = self.layout.history_dir(name);
        fs::create_dir_all(&history_dir).map_err(|e| io_error_at("history_init", &history_dir, e))?;

        let commit_id = fresh_commit_id(name, None, &history_dir)?;
        self.write_snapshot(name, &commit_id, document)?;
        self.write_working(document, working)?;

        let mut tracker = Tracker::new(commit_id.clone(), now_timestamp());
        if let Some(text) = comment {
            tracker.comments.insert(commit_id.clone(), text.to_string());
        }
        self.write_tracker(name, &tracker)?;

        tracing::debug!(document = %name, commit_id = %commit_id, "initialised history");
        Ok(commit_id)
    }

    fn move_current(
        &self,
        working_path: &Path,
        name: &str,
        tracker: &mut Tracker,
        target: String,
        steps: usize,
    ) -> Result<Navigation> {
        let snapshot = self.read_snapshot_bytes(name, &target)?;
        atomic_write(working_path, &snapshot)?;

        let from = std::mem::replace(&mut tracker.current, target.clone());
        self.write_tracker(name, tracker)?;

        tracing::debug!(document = %name, from = %from, to = %target, steps, "moved current");
        Ok(Navigation {
            from,
            to: target,
            steps,
        })
    }

    fn read_tracker(&self, name: &str) -> Result<Option<Tracker>> {
        let path = self.layout.tracker_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|e| io_error_at("tracker_load", &path, e))?;
        let tracker: Tracker = serde_json::from_str(&raw)
            .map_err(|e| corrupt_tracker(name, &format!("unreadable tracker.json: {e}")))?;
        tracker
            .validate()
            .map_err(|reason| corrupt_tracker(name, &reason))?;
        Ok(Some(tracker))
    }

    fn write_tracker(&self, name: &str, tracker: &Tracker) -> Result<()> {
        let json = serde_json::to_string_pretty(tracker).map_err(|e| serialization_error(name, e))?;
        atomic_write(&self.layout.tracker_path(name), json.as_bytes())
    }

    fn write_snapshot(&self, name: &str, commit_id: &str, document: &Document) -> Result<()> {
        let text = encode(document, &self.options);
        atomic_write(&self.layout.snapshot_path(name, commit_id), text.as_bytes())
    }

    fn write_working(&self, document: &Document, working: WorkingFile) -> Result<()> {
        match working {
            WorkingFile::Keep => Ok(()),
            WorkingFile::Rewrite => {
                let text = encode(document, &self.options);
                atomic_write(&document.path, text.as_bytes())
            }
        }
    }

    fn read_snapshot_bytes(&self, name: &str, commit_id: &str) -> Result<Vec<u8>> {
        let path = self.layout.snapshot_path(name, commit_id);
        if !path.exists() {
            return Err(corrupt_tracker(
                name,
                &format!("snapshot of commit {commit_id} is missing"),
            )
            .with_commit_id(commit_id));
        }
        fs::read(&path).map_err(|e| io_error_at("snapshot_read", &path, e))
    }

    fn read_snapshot(&self, name: &str, commit_id: &str) -> Result<Document> {
        let bytes = self.read_snapshot_bytes(name, commit_id)?;
        let text = String::from_utf8_lossy(&bytes);
        decode(&text, self.options.collapse_newlines).map_err(|e| {
            ExError::from(e)
                .with_op("snapshot_decode")
                .with_document(name)
                .with_commit_id(commit_id)
        })
    }
}

/// Whether a commit also rewrites the working file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkingFile {
    Keep,
    Rewrite,
}

fn not_tracked(name: &str) -> ExError {
    HistoryStateError::NotTracked {
        document: name.to_string(),
    }
    .into()
}

fn state_error(name: &str, err: HistoryStateError) -> ExError {
    ExError::from(err).with_document(name)
}

fn ensure_commit(name: &str, tracker: &Tracker, commit_id: &str) -> Result<()> {
    if tracker.contains(commit_id) {
        Ok(())
    } else {
        Err(HistoryStateError::InvalidCommit {
            document: name.to_string(),
            commit_id: commit_id.to_string(),
        }
        .into())
    }
}
