//! Exclusive project lock.
//!
//! Mutating commands hold an exclusive advisory lock on
//! `vendor/.gvend.lock` so two invocations against the same project tree are
//! serialised. The lock is released when the guard is dropped.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::constants::LOCK_FILE;
use crate::utils::fs::ensure_dir;

/// Guard holding the project lock.
pub struct ProjectLock {
    file: File,
    path: PathBuf,
}

impl ProjectLock {
    /// Blocks until the exclusive lock for `vendor_dir` is acquired.
    pub fn acquire(vendor_dir: &Path) -> Result<Self> {
        ensure_dir(vendor_dir)?;
        let path = vendor_dir.join(LOCK_FILE);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        tracing::debug!("Waiting for project lock {}", path.display());
        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire lock: {}", path.display()))?;

        Ok(Self {
            file,
            path,
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        #[allow(unstable_name_collisions)]
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}
