use bibkeep_store::{DocumentStore, StoreConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(dead_code)]
pub const INITIAL: &str = "\
@string{jan = {January}}

@article{milner78,
  author = {Robin Milner},
  title  = {A Theory of Type Polymorphism in Programming},
  year   = 1978,
}
";

/// A scratch working directory with `refs.bib` and a store over it
#[allow(dead_code)]
pub struct Workspace {
    pub dir: TempDir,
    pub store: DocumentStore,
    pub file: PathBuf,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("refs.bib");
        fs::write(&file, INITIAL).unwrap();
        let store = DocumentStore::new(StoreConfig::for_working_dir(dir.path()));
        Self { dir, store, file }
    }

    pub fn history_dir(&self) -> PathBuf {
        self.dir.path().join("history").join("hist_refs.bib")
    }

    pub fn working_text(&self) -> String {
        fs::read_to_string(&self.file).unwrap()
    }

    /// Change the year of the article, save canonically and commit
    pub fn edit_and_commit(&self, year: &str) -> String {
        let mut doc = self.store.load(&self.file).unwrap();
        doc.reference_mut("milner78").unwrap().set_field("year", year);
        self.store.save(&doc).unwrap();
        self.store
            .commit(&doc, None)
            .unwrap()
            .commit_id()
            .to_string()
    }

    pub fn snapshot_count(&self) -> usize {
        count_snapshots(&self.history_dir())
    }
}

#[allow(dead_code)]
pub fn count_snapshots(history_dir: &Path) -> usize {
    fs::read_dir(history_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name() != "tracker.json")
        .count()
}
