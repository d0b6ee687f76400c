// SPDX-License-Identifier: AGPL-3.0-or-later
//! Entries returned by the engine

use crate::{mime, naming, Metadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub extension: String,
}

impl DirectoryEntry {
    pub fn new(path: PathBuf, metadata: &Metadata) -> Self {
        let name = file_name(&path);
        let is_directory = metadata.is_dir();
        let extension = if is_directory {
            String::new()
        } else {
            naming::extension_of(&name)
        };
        Self {
            name,
            path,
            is_directory,
            size: metadata.display_size(),
            modified: metadata.modified,
            extension,
        }
    }

    /// Directories first, then case-insensitive name
    pub fn sort_listing(entries: &mut [DirectoryEntry]) {
        entries.sort_by_cached_key(|e| (!e.is_directory, e.name.to_lowercase()));
    }
}

/// Directory listing result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub directory: PathBuf,
    pub items: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    pub fn new(directory: PathBuf, mut items: Vec<DirectoryEntry>) -> Self {
        DirectoryEntry::sort_listing(&mut items);
        Self { directory, items }
    }
}

/// Full metadata snapshot of a single path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub is_directory: bool,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    pub extension: String,
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

impl FileInfo {
    pub fn new(path: PathBuf, metadata: &Metadata) -> Self {
        let name = file_name(&path);
        Self {
            extension: naming::extension_of(&name),
            mime_type: mime::guess(&path).map(String::from),
            name,
            size: metadata.len,
            is_directory: metadata.is_dir(),
            created: metadata.created,
            modified: metadata.modified,
            accessed: metadata.accessed,
            mode: metadata.permissions.map(|p| p.mode),
            path,
        }
    }
}

/// Recent file that still exists on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentFile {
    pub name: String,
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
}

impl RecentFile {
    pub fn new(path: PathBuf, metadata: &Metadata) -> Self {
        Self {
            name: file_name(&path),
            modified: metadata.modified,
            path,
        }
    }
}

/// The engine's cursor with a display name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentDirectory {
    pub path: PathBuf,
    pub name: String,
}

impl CurrentDirectory {
    pub fn new(path: &Path) -> Self {
        // The root has no file name; show the path itself
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path: path.to_path_buf(), name }
    }
}

/// Last path component as a string, or the whole path when there is none
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntryKind;

    fn meta(kind: EntryKind, len: u64) -> Metadata {
        Metadata {
            kind,
            len,
            created: None,
            modified: None,
            accessed: None,
            permissions: None,
        }
    }

    fn entry(name: &str, dir: bool) -> DirectoryEntry {
        let kind = if dir { EntryKind::Directory } else { EntryKind::File };
        DirectoryEntry::new(PathBuf::from("/x").join(name), &meta(kind, 3))
    }

    #[test]
    fn test_sort_directories_first_then_case_insensitive() {
        let listing = DirectoryListing::new(
            PathBuf::from("/x"),
            vec![
                entry("b.txt", false),
                entry("Zeta", true),
                entry("A.md", false),
                entry("alpha", true),
                entry("c", false),
            ],
        );
        let names: Vec<_> = listing.items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Zeta", "A.md", "b.txt", "c"]);
    }

    #[test]
    fn test_directory_entry_fields() {
        let file = entry("Report.TXT", false);
        assert_eq!(file.extension, ".txt");
        assert_eq!(file.size, 3);

        let dir = entry("photos.d", true);
        assert_eq!(dir.extension, "");
        assert_eq!(dir.size, 0);
    }

    #[test]
    fn test_file_info_mime() {
        let info = FileInfo::new(PathBuf::from("/x/data.json"), &meta(EntryKind::File, 2));
        assert_eq!(info.mime_type.as_deref(), Some("application/json"));
        assert_eq!(info.extension, ".json");

        let info = FileInfo::new(PathBuf::from("/x/blob.qqq"), &meta(EntryKind::File, 2));
        assert!(info.mime_type.is_none());
    }

    #[test]
    fn test_current_directory_name() {
        assert_eq!(CurrentDirectory::new(Path::new("/home/user")).name, "user");
        assert_eq!(CurrentDirectory::new(Path::new("/")).name, "/");
    }
}
