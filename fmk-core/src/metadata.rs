// SPDX-License-Identifier: AGPL-3.0-or-later
//! File and directory metadata as reported by the filesystem boundary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Unknown,
}

/// Unix-style permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub mode: u32,
}

impl Permissions {
    pub fn new(mode: u32) -> Self {
        Self { mode }
    }
}

/// Snapshot of one `stat` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub kind: EntryKind,
    pub len: u64,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    pub permissions: Option<Permissions>,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Size as shown to callers: directories report 0
    pub fn display_size(&self) -> u64 {
        if self.is_dir() {
            0
        } else {
            self.len
        }
    }
}

impl From<std::fs::Metadata> for Metadata {
    fn from(meta: std::fs::Metadata) -> Self {
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else if meta.is_file() {
            EntryKind::File
        } else if meta.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Unknown
        };

        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::MetadataExt;
            Some(Permissions::new(meta.mode()))
        };
        #[cfg(not(unix))]
        let permissions = None;

        Self {
            kind,
            len: meta.len(),
            created: meta.created().ok().map(to_utc),
            modified: meta.modified().ok().map(to_utc),
            accessed: meta.accessed().ok().map(to_utc),
            permissions,
        }
    }
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    time.into()
}
