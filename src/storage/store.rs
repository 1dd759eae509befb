//! File Store
//!
//! The server's flat file directory.
//!
//! ## Responsibilities
//! - Validate client-supplied names against the flat namespace
//! - List and stat regular files (re-scanned on every call, never cached)
//! - Hand out paths for reading, writing, and deleting by name
//! - Hand out per-name locks shared by every session

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::error::{Result, XferError};
use crate::protocol::{FileRecord, ServerInfo};

use super::{FileGuard, FileLocks};

/// Flat directory of served files
///
/// Cloning is cheap; clones share the lock registry.
#[derive(Clone)]
pub struct FileStore {
    /// Absolute path of the served directory
    root: PathBuf,

    locks: FileLocks,
}

impl FileStore {
    /// Open or create the served directory
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;
        let root = fs::canonicalize(path)?;

        Ok(Self {
            root,
            locks: FileLocks::new(),
        })
    }

    /// The served directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check a client-supplied name and return its full path
    ///
    /// Names must refer to an entry directly inside the root: no separators,
    /// no `.`/`..`, no NUL.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_filename(name)?;
        Ok(self.root.join(name))
    }

    /// Lock a name for the duration of a transfer or delete
    ///
    /// Fails with `FileBusy` if another session holds it.
    pub fn lock(&self, name: &str) -> Result<FileGuard> {
        self.locks
            .try_lock(name)
            .ok_or_else(|| XferError::FileBusy(name.to_string()))
    }

    /// List every regular file
    pub fn list(&self) -> Result<Vec<FileRecord>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let metadata = match entry.metadata() {
                Ok(m) => m,
                // Deleted between read_dir and stat
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);

            files.push(FileRecord {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified,
            });
        }

        Ok(files)
    }

    /// Directory statistics
    pub fn info(&self) -> Result<ServerInfo> {
        let files = self.list()?;
        Ok(ServerInfo {
            upload_dir: self.root.display().to_string(),
            total_files: files.len() as u64,
            total_size: files.iter().map(|f| f.size).sum(),
        })
    }

    /// Size of a stored file
    pub fn stat(&self, name: &str) -> Result<u64> {
        let path = self.path_for(name)?;
        match fs::metadata(&path) {
            Ok(m) if m.is_file() => Ok(m.len()),
            Ok(_) => Err(XferError::FileNotFound(name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(XferError::FileNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored file
    pub fn remove(&self, name: &str) -> Result<()> {
        self.stat(name)?;
        match fs::remove_file(self.path_for(name)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(XferError::FileNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Reject names that would escape the flat namespace
pub fn validate_filename(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
        || Path::new(name).is_absolute();

    if invalid {
        return Err(XferError::InvalidFilename(name.to_string()));
    }
    Ok(())
}
