//! Advisory per-document lock
//!
//! The lock is an OS file lock (`flock` on Unix, `LockFileEx` on Windows)
//! taken on a persistent lock file. The kernel drops it when the holder
//! exits, so a crashed process never leaves the history locked. The file
//! itself only records who last held the lock.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error_at, lock_busy, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Exclusive right to mutate one document's history
#[derive(Debug)]
pub struct DocumentLock {
    lock_path: PathBuf,
    file: File,
}

impl DocumentLock {
    /// Take the lock or fail fast with a concurrency error
    pub fn acquire(lock_path: &Path, document: &str) -> Result<Self> {
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error_at("history_lock", parent, e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|e| io_error_at("history_lock", lock_path, e))?;

        if let Err(err) = FileExt::try_lock_exclusive(&file) {
            if is_contended(&err) {
                return Err(lock_busy(document, lock_path));
            }
            return Err(io_error_at("history_lock", lock_path, err));
        }

        let mut lock = Self {
            lock_path: lock_path.to_path_buf(),
            file,
        };
        lock.record_holder();
        tracing::debug!(lock = %lock_path.display(), "acquired history lock");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    /// Release the lock and remove the lock file
    ///
    /// Used once the document's history is gone.
    pub fn release_and_remove(self) {
        let _ = fs::remove_file(&self.lock_path);
        tracing::debug!(lock = %self.lock_path.display(), "removed history lock");
    }

    // Diagnostic only; nothing reads it back.
    fn record_holder(&mut self) {
        if self.file.set_len(0).is_ok() {
            let _ = writeln!(
                self.file,
                "pid={}\nlocal={}",
                std::process::id(),
                chrono::Local::now().to_rfc3339()
            );
        }
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
