//! On-disk layout of the history root
//!
//! ```text
//! <history_root>/
//!   hist_<file name>.lock      OS lock taken while a mutation runs
//!   hist_<file name>/
//!     tracker.json             commit graph and pointers
//!     <commit id>              full encoded snapshot, one per commit
//! ```

#![allow(clippy::result_large_err)]

use crate::errors::{invalid_input, Result};
use std::path::{Path, PathBuf};

pub const TRACKER_FILE: &str = "tracker.json";
const DIR_PREFIX: &str = "hist_";
const LOCK_EXTENSION: &str = ".lock";

/// Path arithmetic for one history root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLayout {
    root: PathBuf,
}

impl HistoryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn history_dir(&self, document: &str) -> PathBuf {
        self.root.join(format!("{DIR_PREFIX}{document}"))
    }

    pub fn tracker_path(&self, document: &str) -> PathBuf {
        self.history_dir(document).join(TRACKER_FILE)
    }

    pub fn snapshot_path(&self, document: &str, commit_id: &str) -> PathBuf {
        self.history_dir(document).join(commit_id)
    }

    pub fn lock_path(&self, document: &str) -> PathBuf {
        self.root
            .join(format!("{DIR_PREFIX}{document}{LOCK_EXTENSION}"))
    }
}

/// History key of a working file: its file name
pub fn document_name(working_path: &Path) -> Result<String> {
    working_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            invalid_input(
                "document_name",
                &format!("{} has no usable file name", working_path.display()),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = HistoryLayout::new("work/history");
        assert_eq!(
            layout.history_dir("refs.bib"),
            PathBuf::from("work/history/hist_refs.bib")
        );
        assert_eq!(
            layout.tracker_path("refs.bib"),
            PathBuf::from("work/history/hist_refs.bib/tracker.json")
        );
        assert_eq!(
            layout.snapshot_path("refs.bib", "abc"),
            PathBuf::from("work/history/hist_refs.bib/abc")
        );
        assert_eq!(
            layout.lock_path("refs.bib"),
            PathBuf::from("work/history/hist_refs.bib.lock")
        );
    }

    #[test]
    fn test_document_name() {
        assert_eq!(document_name(Path::new("a/b/refs.bib")).unwrap(), "refs.bib");
        assert!(document_name(Path::new("..")).is_err());
        assert!(document_name(Path::new("")).is_err());
    }
}
