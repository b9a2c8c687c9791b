//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, io_error_at, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Atomically write bytes to a file
///
/// The content goes to a uniquely named sibling file which is synced and
/// renamed over the target; the parent directory is synced afterwards so
/// the rename itself is durable. Readers see either the old or the new file.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    let parent = target_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        fs::create_dir_all(parent).map_err(|e| io_error("create_parent_dir", e))?;
    }

    let temp_path = temp_path_for(target_path);
    let write_result = (|| -> Result<()> {
        let mut file = File::create(&temp_path).map_err(|e| io_error_at("write_temp", &temp_path, e))?;
        file.write_all(content)
            .map_err(|e| io_error_at("write_temp", &temp_path, e))?;
        file.sync_all()
            .map_err(|e| io_error_at("sync_temp", &temp_path, e))?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    fs::rename(&temp_path, target_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        io_error_at("rename_temp", target_path, e)
    })?;

    if let Some(parent) = parent {
        let dir = File::open(parent).map_err(|e| io_error_at("open_parent_dir", parent, e))?;
        dir.sync_all()
            .map_err(|e| io_error_at("sync_parent_dir", parent, e))?;
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut temp: OsString = path.as_os_str().to_os_string();
    temp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(temp)
}
