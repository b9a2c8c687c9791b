//! Filesystem primitives for the history store
//!
//! Provides:
//! - All-or-nothing file writes (unique temp file, fsync, rename, directory fsync)
//! - An advisory per-document lock file

mod atomic;
mod lock;

pub use atomic::atomic_write;
pub use lock::DocumentLock;
