// SPDX-License-Identifier: AGPL-3.0-or-later
//! Local filesystem backend

use async_trait::async_trait;
use bytes::Bytes;
use fmk_core::{
    backend::{FileSystem, VolumeInfo},
    error::{FmkError, FmkResult, IoResultExt},
    metadata::Metadata,
    platform::{self, PlatformCapabilities},
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem backend
pub struct LocalFileSystem {
    capabilities: PlatformCapabilities,
}

impl LocalFileSystem {
    pub fn new() -> Self {
        Self {
            capabilities: PlatformCapabilities::detect(),
        }
    }

    pub fn with_capabilities(capabilities: PlatformCapabilities) -> Self {
        Self { capabilities }
    }

    /// Carry the source's modification time over to `to`
    async fn copy_modified_time(from: &Path, to: &Path) -> FmkResult<()> {
        let modified = fs::metadata(from).await.at(from)?.modified().at(from)?;
        let target = to.to_path_buf();
        tokio::task::spawn_blocking(move || open_for_times(&target)?.set_modified(modified))
            .await
            .map_err(|e| FmkError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
            .at(to)
    }

    #[cfg(unix)]
    async fn copy_symlink(from: &Path, to: &Path) -> FmkResult<()> {
        let target = fs::read_link(from).await.at(from)?;
        fs::symlink(&target, to).await.at(to)
    }

    #[cfg(not(unix))]
    async fn copy_symlink(from: &Path, to: &Path) -> FmkResult<()> {
        fs::copy(from, to).await.at(from)?;
        Ok(())
    }
}

/// Handle through which timestamps can be set, even on a read-only file
#[cfg(unix)]
fn open_for_times(path: &Path) -> std::io::Result<std::fs::File> {
    // futimens only needs ownership, not write access
    std::fs::File::open(path)
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::windows::fs::OpenOptionsExt;
    // FILE_WRITE_ATTRIBUTES
    std::fs::OpenOptions::new().access_mode(0x0100).open(path)
}

#[cfg(not(any(unix, windows)))]
fn open_for_times(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new().write(true).open(path)
}

impl Default for LocalFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn metadata(&self, path: &Path) -> FmkResult<Metadata> {
        Ok(fs::metadata(path).await.at(path)?.into())
    }

    async fn symlink_metadata(&self, path: &Path) -> FmkResult<Metadata> {
        Ok(fs::symlink_metadata(path).await.at(path)?.into())
    }

    async fn read_dir(&self, path: &Path) -> FmkResult<Vec<PathBuf>> {
        let mut children = Vec::new();
        let mut read_dir = fs::read_dir(path).await.at(path)?;

        while let Some(entry) = read_dir.next_entry().await.at(path)? {
            children.push(entry.path());
        }

        Ok(children)
    }

    async fn create_dir(&self, path: &Path) -> FmkResult<()> {
        fs::create_dir(path).await.at(path)
    }

    async fn create_new(&self, path: &Path, data: &[u8]) -> FmkResult<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .at(path)?;
        file.write_all(data).await.at(path)?;
        file.flush().await.at(path)
    }

    async fn read(&self, path: &Path) -> FmkResult<Bytes> {
        Ok(Bytes::from(fs::read(path).await.at(path)?))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> FmkResult<()> {
        fs::write(path, data).await.at(path)
    }

    async fn remove_file(&self, path: &Path) -> FmkResult<()> {
        fs::remove_file(path).await.at(path)
    }

    async fn remove_tree(&self, path: &Path) -> FmkResult<()> {
        // Directories in discovery order; removed in reverse so children go first
        let mut pending = vec![path.to_path_buf()];
        let mut visited = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut read_dir = fs::read_dir(&dir).await.at(&dir)?;
            while let Some(entry) = read_dir.next_entry().await.at(&dir)? {
                let child = entry.path();
                let file_type = entry.file_type().await.at(&child)?;
                if file_type.is_dir() {
                    pending.push(child);
                } else {
                    fs::remove_file(&child).await.at(&child)?;
                }
            }
            visited.push(dir);
        }

        for dir in visited.iter().rev() {
            fs::remove_dir(dir).await.at(dir)?;
        }
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> FmkResult<()> {
        fs::rename(from, to).await.at(from)
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> FmkResult<()> {
        // fs::copy carries permission bits
        fs::copy(from, to).await.at(from)?;
        if let Err(e) = Self::copy_modified_time(from, to).await {
            tracing::warn!("Could not preserve modification time on {}: {}", to.display(), e);
        }
        Ok(())
    }

    async fn copy_tree(&self, from: &Path, to: &Path) -> FmkResult<()> {
        let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];
        // Permissions are applied last so read-only directories can be filled
        let mut permissions = Vec::new();

        while let Some((src_dir, dst_dir)) = pending.pop() {
            fs::create_dir(&dst_dir).await.at(&dst_dir)?;
            let perms = fs::metadata(&src_dir).await.at(&src_dir)?.permissions();
            permissions.push((dst_dir.clone(), perms));

            let mut read_dir = fs::read_dir(&src_dir).await.at(&src_dir)?;
            while let Some(entry) = read_dir.next_entry().await.at(&src_dir)? {
                let src = entry.path();
                let dst = dst_dir.join(entry.file_name());
                let file_type = entry.file_type().await.at(&src)?;

                if file_type.is_dir() {
                    pending.push((src, dst));
                } else if file_type.is_symlink() {
                    Self::copy_symlink(&src, &dst).await?;
                } else {
                    self.copy_file(&src, &dst).await?;
                }
            }
        }

        for (dir, perms) in permissions.into_iter().rev() {
            fs::set_permissions(&dir, perms).await.at(&dir)?;
        }
        Ok(())
    }

    async fn move_to(&self, from: &Path, to: &Path) -> FmkResult<()> {
        match fs::rename(from, to).await {
            Ok(()) => Ok(()),
            Err(e) if platform::is_cross_device(&e) => {
                tracing::debug!("Cross-device move of {}; copying instead", from.display());
                let meta = self.symlink_metadata(from).await?;
                if meta.is_dir() {
                    self.copy_tree(from, to).await?;
                    self.remove_tree(from).await
                } else {
                    self.copy_file(from, to).await?;
                    self.remove_file(from).await
                }
            }
            Err(e) => Err(FmkError::from_io(e, from)),
        }
    }

    async fn volumes(&self) -> FmkResult<Vec<VolumeInfo>> {
        if !self.capabilities.volume_info || !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(FmkError::Unsupported(
                "Volume information is not available on this platform".into(),
            ));
        }

        tokio::task::spawn_blocking(|| {
            let disks = sysinfo::Disks::new_with_refreshed_list();
            disks
                .list()
                .iter()
                .filter(|disk| disk.total_space() > 0)
                .map(|disk| {
                    VolumeInfo::new(
                        disk.name().to_string_lossy(),
                        disk.mount_point(),
                        disk.file_system().to_string_lossy(),
                        disk.total_space(),
                        disk.available_space(),
                    )
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| FmkError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_new_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let path = dir.path().join("a.txt");

        fs.create_new(&path, b"one").await.unwrap();
        let err = fs.create_new(&path, b"two").await.unwrap_err();
        assert!(matches!(err, FmkError::AlreadyExists(_)));
        assert_eq!(std::fs::read(&path).unwrap(), b"one");
    }

    #[tokio::test]
    async fn test_create_dir_needs_parent() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let err = fs.create_dir(&dir.path().join("a/b")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tree");
        std::fs::create_dir_all(root.join("a/b/c")).unwrap();
        std::fs::write(root.join("top.txt"), "x").unwrap();
        std::fs::write(root.join("a/b/c/deep.txt"), "y").unwrap();

        LocalFileSystem::new().remove_tree(&root).await.unwrap();
        assert!(!root.exists());
        assert!(dir.path().exists());
    }

    #[tokio::test]
    async fn test_copy_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("nested/empty")).unwrap();
        std::fs::write(src.join("nested/file.txt"), "content").unwrap();

        let dst = dir.path().join("dst");
        LocalFileSystem::new().copy_tree(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read_to_string(dst.join("nested/file.txt")).unwrap(), "content");
        assert!(dst.join("nested/empty").is_dir());
        assert!(src.join("nested/file.txt").exists());
    }

    #[tokio::test]
    async fn test_copy_file_preserves_modified_time() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        std::fs::write(&src, "data").unwrap();
        let past = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
        std::fs::File::options().write(true).open(&src).unwrap().set_modified(past).unwrap();

        let dst = dir.path().join("dst.txt");
        LocalFileSystem::new().copy_file(&src, &dst).await.unwrap();

        let src_time = std::fs::metadata(&src).unwrap().modified().unwrap();
        let dst_time = std::fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(src_time, dst_time);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_file_preserves_modified_time_of_read_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("locked.txt");
        std::fs::write(&src, "data").unwrap();
        let past = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
        std::fs::File::options().write(true).open(&src).unwrap().set_modified(past).unwrap();
        std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o444)).unwrap();

        let dst = dir.path().join("copy.txt");
        LocalFileSystem::new().copy_file(&src, &dst).await.unwrap();

        let dst_meta = std::fs::metadata(&dst).unwrap();
        assert_eq!(dst_meta.permissions().mode() & 0o777, 0o444);
        assert_eq!(
            std::fs::metadata(&src).unwrap().modified().unwrap(),
            dst_meta.modified().unwrap()
        );

        // The handle used for timestamps is read-only
        let handle = open_for_times(&dst).unwrap();
        handle.set_modified(past).unwrap();
    }

    #[tokio::test]
    async fn test_move_to() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        std::fs::write(&src, "moved").unwrap();
        let dst = dir.path().join("b.txt");

        LocalFileSystem::new().move_to(&src, &dst).await.unwrap();
        assert!(!src.exists());
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "moved");
    }

    #[tokio::test]
    async fn test_volumes_unsupported() {
        let fs = LocalFileSystem::with_capabilities(PlatformCapabilities::minimal());
        let err = fs.volumes().await.unwrap_err();
        assert!(matches!(err, FmkError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_is_occupied_sees_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let link = dir.path().join("dangling");
        assert!(!fs.is_occupied(&link).await.unwrap());

        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(dir.path().join("missing"), &link).unwrap();
            assert!(fs.is_occupied(&link).await.unwrap());
            assert!(!fs.exists(&link).await);
        }
    }
}
