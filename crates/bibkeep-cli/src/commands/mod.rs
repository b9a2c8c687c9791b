pub mod fmt;
pub mod history;
pub mod ls;

use bibkeep_store::{DocumentStore, StoreConfig};
use std::path::{Path, PathBuf};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Build the store from an optional config file and flag overrides
pub fn open_store(
    config_path: Option<&Path>,
    history_root: Option<PathBuf>,
) -> Result<DocumentStore, Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    if let Some(root) = history_root {
        config.history_root = root;
    }
    Ok(DocumentStore::new(config))
}
