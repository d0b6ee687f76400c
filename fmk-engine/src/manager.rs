// SPDX-License-Identifier: AGPL-3.0-or-later
//! The file-management engine
//!
//! [`FileManager`] owns the current-directory cursor and the recent-file
//! history and performs every operation through a [`FileSystem`]. State is
//! only touched after the filesystem work of an operation has succeeded.

use chrono::Local;
use fmk_core::{
    encoding::TextDecoder,
    entry::{CurrentDirectory, DirectoryEntry, DirectoryListing, FileInfo, RecentFile},
    error::{FmkError, FmkResult},
    metadata::{EntryKind, Metadata},
    mime, naming, DirectoryState, EngineConfig, FileSystem, VolumeInfo,
};
use fmk_search::{SearchOutcome, SearchQuery};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::local::LocalFileSystem;

/// Text returned by [`FileManager::read_file`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    pub path: PathBuf,
    pub content: String,
    pub size: u64,
    pub mime_type: Option<String>,
    pub encoding: String,
}

/// Result of [`FileManager::write_file`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOutcome {
    pub path: PathBuf,
    /// Snapshot of the previous content, when one was taken
    pub backup: Option<PathBuf>,
}

/// Stateful local file manager
pub struct FileManager {
    fs: Arc<dyn FileSystem>,
    state: RwLock<DirectoryState>,
    config: EngineConfig,
    decoder: TextDecoder,
}

impl FileManager {
    /// Engine over the local filesystem, starting in `config.start_dir` or
    /// the process working directory
    pub fn new(config: EngineConfig) -> FmkResult<Self> {
        let cwd = std::env::current_dir()?;
        let start = match &config.start_dir {
            Some(dir) => normalize(&cwd.join(dir)),
            None => cwd,
        };
        let meta = std::fs::metadata(&start).map_err(|e| FmkError::from_io(e, &start))?;
        if !meta.is_dir() {
            return Err(FmkError::NotADirectory(start.display().to_string()));
        }
        Self::with_filesystem(Arc::new(LocalFileSystem::new()), start, config)
    }

    /// Engine over an arbitrary filesystem; `start_dir` must be absolute
    pub fn with_filesystem(
        fs: Arc<dyn FileSystem>,
        start_dir: impl Into<PathBuf>,
        config: EngineConfig,
    ) -> FmkResult<Self> {
        config.validate()?;
        let start_dir = start_dir.into();
        if !start_dir.is_absolute() {
            return Err(FmkError::InvalidPath(format!(
                "start directory must be absolute: {}",
                start_dir.display()
            )));
        }
        let decoder = config.decoder()?;
        let state = DirectoryState::with_capacity(normalize(&start_dir), config.recent_capacity);
        Ok(Self {
            fs,
            state: RwLock::new(state),
            config,
            decoder,
        })
    }

    pub async fn current_path(&self) -> PathBuf {
        self.state.read().await.current_path().to_path_buf()
    }

    pub async fn current_directory(&self) -> CurrentDirectory {
        CurrentDirectory::new(self.state.read().await.current_path())
    }

    /// Absolute, lexically normalized form of `path`
    async fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.state.read().await.resolve(path))
        }
    }

    async fn remember(&self, path: &Path) {
        self.state.write().await.push_recent(path);
    }

    // ---- Listing & navigation ----

    /// List `path` (moving the cursor there) or the current directory
    pub async fn list_directory(&self, path: Option<&Path>) -> FmkResult<DirectoryListing> {
        let (dir, moves) = match path {
            Some(path) => {
                let dir = self.absolute(path).await;
                let meta = self.fs.metadata(&dir).await?;
                if !meta.is_dir() {
                    return Err(FmkError::NotADirectory(dir.display().to_string()));
                }
                (dir, true)
            }
            None => (self.current_path().await, false),
        };

        let items = self.read_entries(&dir).await?;

        if moves {
            tracing::debug!("Current directory is now {}", dir.display());
            self.state.write().await.set_current_path(&dir);
        }

        Ok(DirectoryListing::new(dir, items))
    }

    async fn read_entries(&self, dir: &Path) -> FmkResult<Vec<DirectoryEntry>> {
        let children = self.fs.read_dir(dir).await?;
        let mut items = Vec::with_capacity(children.len());

        for child in children {
            match self.fs.metadata(&child).await {
                Ok(meta) => items.push(DirectoryEntry::new(child, &meta)),
                // Removed since enumeration, or a dangling symlink
                Err(e) if e.is_not_found() => {
                    tracing::debug!("Skipping {}: {}", child.display(), e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(items)
    }

    /// List the parent of the current directory, or re-list at the root
    pub async fn navigate_to_parent(&self) -> FmkResult<DirectoryListing> {
        let current = self.current_path().await;
        match current.parent() {
            Some(parent) if parent != current && !parent.as_os_str().is_empty() => {
                self.list_directory(Some(parent)).await
            }
            _ => self.list_directory(None).await,
        }
    }

    // ---- Creation ----

    /// Create a single directory relative to the current directory
    pub async fn create_directory(&self, name: &str) -> FmkResult<PathBuf> {
        if name.is_empty() {
            return Err(FmkError::InvalidPath("empty directory name".into()));
        }
        let path = self.absolute(Path::new(name)).await;
        if self.fs.is_occupied(&path).await? {
            return Err(FmkError::AlreadyExists(path.display().to_string()));
        }

        self.fs.create_dir(&path).await?;
        tracing::info!("Created directory {}", path.display());
        Ok(path)
    }

    /// Create a new file relative to the current directory
    pub async fn create_file(&self, name: &str, content: &str) -> FmkResult<PathBuf> {
        if name.is_empty() {
            return Err(FmkError::InvalidPath("empty file name".into()));
        }
        let path = self.absolute(Path::new(name)).await;
        if self.fs.is_occupied(&path).await? {
            return Err(FmkError::AlreadyExists(path.display().to_string()));
        }

        self.fs.create_new(&path, content.as_bytes()).await?;
        tracing::info!("Created file {}", path.display());
        self.remember(&path).await;
        Ok(path)
    }

    // ---- Read / write ----

    /// Read a text file of at most `max_read_bytes`
    pub async fn read_file(&self, path: &Path) -> FmkResult<FileContent> {
        let path = self.absolute(path).await;
        let meta = self.fs.metadata(&path).await?;
        if !meta.is_file() {
            return Err(FmkError::NotAFile(path.display().to_string()));
        }
        self.check_size(&path, meta.len)?;

        let mime_type = mime::guess(&path);
        if let Some(mime) = mime_type {
            if !mime::is_textual(mime) {
                return Err(FmkError::UnsupportedType(mime.to_string()));
            }
        }

        let bytes = self.fs.read(&path).await?;
        // The file may have grown since it was stat'ed
        self.check_size(&path, bytes.len() as u64)?;

        let decoded = self.decoder.decode(&bytes).ok_or_else(|| {
            FmkError::UnsupportedEncoding(format!(
                "{} is neither utf-8 nor {}",
                path.display(),
                self.decoder.fallback_name()
            ))
        })?;

        tracing::debug!("Read {} ({} bytes, {})", path.display(), bytes.len(), decoded.encoding);
        self.remember(&path).await;
        Ok(FileContent {
            size: bytes.len() as u64,
            mime_type: mime_type.map(String::from),
            encoding: decoded.encoding,
            content: decoded.content,
            path,
        })
    }

    fn check_size(&self, path: &Path, size: u64) -> FmkResult<()> {
        if size > self.config.max_read_bytes {
            return Err(FmkError::TooLarge {
                path: path.display().to_string(),
                size,
                limit: self.config.max_read_bytes,
            });
        }
        Ok(())
    }

    /// Overwrite (or create) `path`, snapshotting any previous content first
    pub async fn write_file(&self, path: &Path, content: &str) -> FmkResult<WriteOutcome> {
        let path = self.absolute(path).await;

        let backup = match self.fs.metadata(&path).await {
            Ok(meta) if meta.is_dir() => {
                return Err(FmkError::NotAFile(path.display().to_string()));
            }
            Ok(_) if self.config.backup_on_write => self.backup(&path).await,
            _ => None,
        };

        self.fs.write(&path, content.as_bytes()).await?;
        tracing::info!("Wrote {} bytes to {}", content.len(), path.display());
        self.remember(&path).await;
        Ok(WriteOutcome { path, backup })
    }

    /// Best-effort copy to `<path>.backup.<YYYYMMDD_HHMMSS>`
    async fn backup(&self, path: &Path) -> Option<PathBuf> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let mut name = path.as_os_str().to_owned();
        name.push(format!(".backup.{stamp}"));
        let backup = PathBuf::from(name);

        match self.fs.copy_file(path, &backup).await {
            Ok(()) => {
                tracing::debug!("Backed up {} to {}", path.display(), backup.display());
                Some(backup)
            }
            Err(e) => {
                tracing::warn!("Backup of {} failed, writing anyway: {}", path.display(), e);
                None
            }
        }
    }

    // ---- Delete / rename ----

    /// Delete a file, symlink, or whole directory tree
    pub async fn delete_item(&self, path: &Path) -> FmkResult<EntryKind> {
        let path = self.absolute(path).await;
        let meta = self.fs.symlink_metadata(&path).await?;

        match meta.kind {
            EntryKind::Directory => self.fs.remove_tree(&path).await?,
            _ => self.fs.remove_file(&path).await?,
        }

        tracing::info!("Deleted {}", path.display());
        Ok(meta.kind)
    }

    /// Rename within the same directory
    pub async fn rename_item(&self, old_path: &Path, new_name: &str) -> FmkResult<PathBuf> {
        let old_path = self.absolute(old_path).await;
        self.fs.symlink_metadata(&old_path).await?;
        naming::validate_component(new_name)?;

        let parent = old_path
            .parent()
            .ok_or_else(|| FmkError::InvalidPath(format!("cannot rename {}", old_path.display())))?;
        let new_path = parent.join(new_name);
        if self.fs.is_occupied(&new_path).await? {
            return Err(FmkError::AlreadyExists(new_path.display().to_string()));
        }

        self.fs.rename(&old_path, &new_path).await?;
        tracing::info!("Renamed {} to {}", old_path.display(), new_path.display());
        Ok(new_path)
    }

    // ---- Copy / move ----

    /// Copy into `destination_dir`, picking a free name on collision
    pub async fn copy_item(&self, source: &Path, destination_dir: &Path) -> FmkResult<PathBuf> {
        let (source, meta, destination) = self.resolve_destination(source, destination_dir).await?;

        if meta.is_dir() {
            self.fs.copy_tree(&source, &destination).await?;
        } else {
            self.fs.copy_file(&source, &destination).await?;
        }

        tracing::info!("Copied {} to {}", source.display(), destination.display());
        Ok(destination)
    }

    /// Move into `destination_dir`, picking a free name on collision
    pub async fn move_item(&self, source: &Path, destination_dir: &Path) -> FmkResult<PathBuf> {
        let (source, _, destination) = self.resolve_destination(source, destination_dir).await?;

        self.fs.move_to(&source, &destination).await?;
        tracing::info!("Moved {} to {}", source.display(), destination.display());
        Ok(destination)
    }

    /// Validate both ends and find the first unoccupied candidate name
    async fn resolve_destination(
        &self,
        source: &Path,
        destination_dir: &Path,
    ) -> FmkResult<(PathBuf, Metadata, PathBuf)> {
        let source = self.absolute(source).await;
        let destination_dir = self.absolute(destination_dir).await;

        let meta = self.fs.metadata(&source).await?;
        let dest_meta = self.fs.metadata(&destination_dir).await?;
        if !dest_meta.is_dir() {
            return Err(FmkError::NotADirectory(destination_dir.display().to_string()));
        }
        if meta.is_dir() && destination_dir.starts_with(&source) {
            return Err(FmkError::InvalidPath(format!(
                "cannot place {} inside itself",
                source.display()
            )));
        }

        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| FmkError::InvalidPath(source.display().to_string()))?;

        let is_file = !meta.is_dir();
        let max = self.config.max_name_attempts;
        for attempt in 0..=max {
            let candidate = destination_dir.join(naming::candidate_name(&name, is_file, attempt));
            if !self.fs.is_occupied(&candidate).await? {
                return Ok((source, meta, candidate));
            }
        }

        Err(FmkError::ExhaustedNameSpace { name, attempts: max })
    }

    // ---- Search & inspection ----

    /// Case-insensitive file-name search below `search_path` or the current directory
    pub async fn search_files(
        &self,
        pattern: &str,
        search_path: Option<&Path>,
        glob: bool,
    ) -> FmkResult<SearchOutcome> {
        let root = match search_path {
            Some(path) => self.absolute(path).await,
            None => self.current_path().await,
        };
        if !self.fs.exists(&root).await {
            return Err(FmkError::NotFound(root.display().to_string()));
        }

        let query = SearchQuery::new(pattern, root)
            .with_limit(self.config.search_limit)
            .with_glob(glob);
        Ok(fmk_search::search(query).await?)
    }

    pub async fn get_file_info(&self, path: &Path) -> FmkResult<FileInfo> {
        let path = self.absolute(path).await;
        let meta = self.fs.metadata(&path).await?;
        Ok(FileInfo::new(path, &meta))
    }

    /// Recent files that still exist; the stored history is left as is
    pub async fn get_recent_files(&self) -> Vec<RecentFile> {
        let paths: Vec<PathBuf> = {
            let state = self.state.read().await;
            state.recent_files().map(Path::to_path_buf).collect()
        };

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            if let Ok(meta) = self.fs.metadata(&path).await {
                files.push(RecentFile::new(path, &meta));
            }
        }
        files
    }

    pub async fn get_volume_info(&self) -> FmkResult<Vec<VolumeInfo>> {
        self.fs.volumes().await
    }
}

/// Resolve `.` and `..` components without touching the filesystem
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Path::new("/../..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("/a/b/")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_with_filesystem_requires_absolute_start() {
        let result = FileManager::with_filesystem(
            Arc::new(LocalFileSystem::new()),
            "relative/dir",
            EngineConfig::default(),
        );
        assert!(matches!(result, Err(FmkError::InvalidPath(_))));
    }
}
