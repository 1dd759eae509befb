//! Per-filename locks
//!
//! Keeps upload, download, and delete of the same name from overlapping
//! across sessions. Listings do not lock. Acquisition never waits: a session
//! that finds the name held answers "file busy" instead of blocking behind a
//! peer that may be idle.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

/// Registry of locks keyed by filename
///
/// Only held names are stored.
#[derive(Clone, Default)]
pub struct FileLocks {
    held: Arc<Mutex<HashSet<String>>>,
}

/// Held lock on one filename; released on drop
pub struct FileGuard {
    name: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl FileLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the named file, or `None` if another session holds it
    pub fn try_lock(&self, name: &str) -> Option<FileGuard> {
        if !self.held.lock().insert(name.to_string()) {
            return None;
        }

        Some(FileGuard {
            name: name.to_string(),
            held: Arc::clone(&self.held),
        })
    }

    /// Number of names currently held
    pub fn active(&self) -> usize {
        self.held.lock().len()
    }
}

impl FileGuard {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        self.held.lock().remove(&self.name);
    }
}
