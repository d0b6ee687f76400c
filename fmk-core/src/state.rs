// SPDX-License-Identifier: AGPL-3.0-or-later
//! Current-directory cursor and recent-file history

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Default number of remembered files
pub const DEFAULT_RECENT_CAPACITY: usize = 10;

/// Mutable engine state.
///
/// `current_path` is only replaced with a directory that was just listed, and
/// `recent` is most-recent-first with no duplicates.
#[derive(Debug, Clone)]
pub struct DirectoryState {
    current_path: PathBuf,
    recent: VecDeque<PathBuf>,
    capacity: usize,
}

impl DirectoryState {
    pub fn new(current_path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(current_path, DEFAULT_RECENT_CAPACITY)
    }

    pub fn with_capacity(current_path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            current_path: current_path.into(),
            recent: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn set_current_path(&mut self, path: impl Into<PathBuf>) {
        self.current_path = path.into();
    }

    /// Resolve `name` against the current directory
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        self.current_path.join(name)
    }

    /// Record a touched file, moving it to the front if already present
    pub fn push_recent(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.recent.retain(|p| p != &path);
        self.recent.push_front(path);
        self.recent.truncate(self.capacity);
    }

    pub fn recent_files(&self) -> impl Iterator<Item = &Path> {
        self.recent.iter().map(PathBuf::as_path)
    }
}
