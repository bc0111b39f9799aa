//! Local scratch file for the downloaded CSV.
//!
//! A [`StagedAsset`] removes its file when released or dropped, unless the
//! staging area was configured to keep it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, Result};

/// Fixed scratch location plus the keep policy.
#[derive(Debug, Clone)]
pub struct StagingArea {
    scratch_file: PathBuf,
    keep: bool,
}

impl StagingArea {
    #[must_use]
    pub const fn new(scratch_file: PathBuf, keep: bool) -> Self {
        Self { scratch_file, keep }
    }

    /// Writes `bytes` to the scratch file, overwriting any leftover.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn stage(&self, bytes: &[u8]) -> Result<StagedAsset> {
        if self.scratch_file.exists() {
            tracing::debug!(path = %self.scratch_file.display(), "Overwriting leftover scratch file");
        }

        // Arm cleanup before writing so a partial write is removed too.
        let asset = StagedAsset {
            path: self.scratch_file.clone(),
            keep: self.keep,
            released: false,
        };

        fs::write(&self.scratch_file, bytes).map_err(|e| {
            AppError::io(
                format!("Failed to write {}", self.scratch_file.display()),
                e,
            )
        })?;

        tracing::debug!(path = %self.scratch_file.display(), bytes = bytes.len(), "Staged export");
        Ok(asset)
    }
}

/// Exported bytes on disk, consumed once by a converter.
#[derive(Debug)]
pub struct StagedAsset {
    path: PathBuf,
    keep: bool,
    released: bool,
}

impl StagedAsset {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the backing file unless it is kept.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be removed.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        if self.keep {
            tracing::info!(path = %self.path.display(), "Keeping CSV file");
            return Ok(());
        }
        remove(&self.path)
            .map_err(|e| AppError::io(format!("Failed to remove {}", self.path.display()), e))
    }
}

impl Drop for StagedAsset {
    fn drop(&mut self) {
        if self.released || self.keep {
            return;
        }
        if let Err(e) = remove(&self.path) {
            tracing::warn!("Failed to remove {}: {}", self.path.display(), e);
        }
    }
}

fn remove(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
