//! Store configuration
//!
//! Loaded from an optional JSON file; keys left out take their defaults and
//! unknown keys are rejected.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error_at, Result};
use bibkeep_core::codec::EncodeOptions;
use bibkeep_core::errors::{ExError, ExErrorKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory holding the bibliography files. Default: `.`
    pub working_dir: PathBuf,
    /// History root; a relative path is taken from `working_dir`. Default: `history`
    pub history_root: PathBuf,
    /// Fold raw newlines inside values to single spaces. Default: true
    pub collapse_newlines: bool,
    /// Column of `=` when encoding. Default: computed per document
    pub align_column: Option<usize>,
    /// Wrap field values beyond this line length. Default: no wrapping
    pub max_line_length: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            history_root: PathBuf::from("history"),
            collapse_newlines: true,
            align_column: None,
            max_line_length: None,
        }
    }
}

impl StoreConfig {
    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| io_error_at("config_load", path, e))?;
        Self::from_json(&raw).map_err(|e| e.with_document(path.display().to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("config_load")
                .with_message(format!("invalid config: {}", e))
        })
    }

    /// Config rooted at `working_dir` with every other value defaulted
    pub fn for_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            ..Self::default()
        }
    }

    /// Absolute-or-working-dir-relative history root
    pub fn history_root_path(&self) -> PathBuf {
        if self.history_root.is_absolute() {
            self.history_root.clone()
        } else {
            self.working_dir.join(&self.history_root)
        }
    }

    /// Relative document paths are taken from `working_dir`
    pub fn resolve_document(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            align_column: self.align_column,
            max_line_length: self.max_line_length,
            collapse_newlines: self.collapse_newlines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.working_dir, PathBuf::from("."));
        assert_eq!(config.history_root_path(), PathBuf::from("./history"));
        assert!(config.collapse_newlines);
        assert_eq!(config.encode_options(), EncodeOptions::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = StoreConfig::from_json(r#"{"working_dir": "/data/bib", "max_line_length": 80}"#).unwrap();
        assert_eq!(config.working_dir, PathBuf::from("/data/bib"));
        assert_eq!(config.history_root_path(), PathBuf::from("/data/bib/history"));
        assert_eq!(config.max_line_length, Some(80));
        assert!(config.collapse_newlines);
    }

    #[test]
    fn test_resolve_document() {
        let config = StoreConfig::for_working_dir("/data/bib");
        assert_eq!(
            config.resolve_document(Path::new("refs.bib")),
            PathBuf::from("/data/bib/refs.bib")
        );
        assert_eq!(
            config.resolve_document(Path::new("/tmp/other.bib")),
            PathBuf::from("/tmp/other.bib")
        );
    }

    #[test]
    fn test_absolute_history_root_is_kept() {
        let config = StoreConfig::from_json(r#"{"history_root": "/var/bibkeep"}"#).unwrap();
        assert_eq!(config.history_root_path(), PathBuf::from("/var/bibkeep"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = StoreConfig::from_json(r#"{"working_directory": "."}"#).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bibkeep.json");
        fs::write(&path, r#"{"collapse_newlines": false, "align_column": 20}"#).unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert!(!config.collapse_newlines);
        assert_eq!(config.align_column, Some(20));

        let missing = StoreConfig::load(&temp_dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.kind(), ExErrorKind::Io);
    }
}
