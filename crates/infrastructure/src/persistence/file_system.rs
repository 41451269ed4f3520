//! Real file system implementation.

use std::path::Path;

use tokio::fs;
use dnac_application::ports::{FileSystem, FileSystemError};

/// Real file system implementation using `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    /// Creates a new `TokioFileSystem`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileSystem for TokioFileSystem {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FileSystemError> {
        fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FileSystemError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => {
                FileSystemError::PermissionDenied(path.to_path_buf())
            }
            _ => FileSystemError::Io(e),
        })
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, contents).await.map_err(FileSystemError::Io)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), FileSystemError> {
        fs::create_dir_all(path).await.map_err(FileSystemError::Io)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FileSystemError> {
        fs::rename(from, to).await.map_err(FileSystemError::Io)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_creates_parent_and_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("file.json");
        let fs = TokioFileSystem::new();

        fs.write_file(&path, b"{}").await.unwrap();

        assert!(path.exists());
        assert_eq!(fs.read_file(&path).await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let result = TokioFileSystem::new()
            .read_file(&dir.path().join("missing"))
            .await;
        assert!(matches!(result, Err(FileSystemError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rename_replaces_target() {
        let dir = tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let from = dir.path().join("a.tmp");
        let to = dir.path().join("a");

        fs.write_file(&to, b"old").await.unwrap();
        fs.write_file(&from, b"new").await.unwrap();
        fs.rename(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(fs.read_file(&to).await.unwrap(), b"new");
    }
}
