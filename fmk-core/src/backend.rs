// SPDX-License-Identifier: AGPL-3.0-or-later
//! Filesystem boundary trait
//!
//! Every OS call the engine makes goes through [`FileSystem`]. Each method
//! is fallible and reports io failures as typed [`FmkError`](crate::FmkError)s.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{error::FmkResult, Metadata};

/// A mounted volume and its usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub name: String,
    pub mountpoint: PathBuf,
    pub fstype: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    /// Used share of `total`, rounded to one decimal
    pub percent: f64,
}

impl VolumeInfo {
    pub fn new(
        name: impl Into<String>,
        mountpoint: impl Into<PathBuf>,
        fstype: impl Into<String>,
        total: u64,
        free: u64,
    ) -> Self {
        let used = total.saturating_sub(free);
        Self {
            name: name.into(),
            mountpoint: mountpoint.into(),
            fstype: fstype.into(),
            total,
            used,
            free,
            percent: used_percent(used, total),
        }
    }
}

pub fn used_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = used as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// OS file I/O boundary
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// `stat`, following symlinks
    async fn metadata(&self, path: &Path) -> FmkResult<Metadata>;

    /// `lstat`: symlinks are reported as themselves
    async fn symlink_metadata(&self, path: &Path) -> FmkResult<Metadata>;

    /// Paths of the direct children of `path`
    async fn read_dir(&self, path: &Path) -> FmkResult<Vec<PathBuf>>;

    /// Create a single directory; the parent must exist
    async fn create_dir(&self, path: &Path) -> FmkResult<()>;

    /// Create a file that must not exist yet
    async fn create_new(&self, path: &Path, data: &[u8]) -> FmkResult<()>;

    async fn read(&self, path: &Path) -> FmkResult<Bytes>;

    /// Create or truncate `path` and write `data`
    async fn write(&self, path: &Path, data: &[u8]) -> FmkResult<()>;

    async fn remove_file(&self, path: &Path) -> FmkResult<()>;

    /// Remove a directory and everything below it
    async fn remove_tree(&self, path: &Path) -> FmkResult<()>;

    async fn rename(&self, from: &Path, to: &Path) -> FmkResult<()>;

    /// Copy a file, keeping permissions and modification time
    async fn copy_file(&self, from: &Path, to: &Path) -> FmkResult<()>;

    /// Copy a directory tree; `to` must not exist
    async fn copy_tree(&self, from: &Path, to: &Path) -> FmkResult<()>;

    /// Move `from` to `to`, across devices if needed
    async fn move_to(&self, from: &Path, to: &Path) -> FmkResult<()>;

    async fn volumes(&self) -> FmkResult<Vec<VolumeInfo>>;

    async fn exists(&self, path: &Path) -> bool {
        self.metadata(path).await.is_ok()
    }

    /// Whether anything, including a dangling symlink, occupies `path`
    async fn is_occupied(&self, path: &Path) -> FmkResult<bool> {
        match self.symlink_metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
