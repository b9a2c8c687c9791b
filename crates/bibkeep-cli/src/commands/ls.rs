//! Working directory listing

use super::CommandResult;
use bibkeep_store::DocumentStore;

pub fn execute(store: &DocumentStore) -> CommandResult {
    for path in store.list_documents()? {
        let tracked = store.history_store().is_tracked(&path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if tracked {
            println!("{name}\ttracked");
        } else {
            println!("{name}");
        }
    }
    Ok(())
}
