//! Filesystem-backed media store.

use super::service::{MediaError, MediaResult, MediaStore, Upload, new_media_path, validate_media_path};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};

/// Stores uploads as files under a root directory (`MEDIA_ROOT`).
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    /// Creates the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Io`] if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> MediaResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        info!("Media store at {}", root.display());
        Ok(Self { root })
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn save(&self, upload: Upload) -> MediaResult<String> {
        let relative = new_media_path(&upload);
        let full = self.root.join(&relative);

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, &upload.bytes).await?;

        debug!("Stored {} bytes at {}", upload.bytes.len(), relative);
        Ok(relative)
    }

    async fn read(&self, path: &str) -> MediaResult<Vec<u8>> {
        validate_media_path(path)?;

        match tokio::fs::read(self.root.join(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(MediaError::NotFound(path.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn health_check(&self) -> bool {
        tokio::fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip_bytes() {
        let dir = TempDir::new().expect("temp dir");
        let store = FsMediaStore::open(dir.path()).await.unwrap();
        let bytes = b"GIF89a\x02\x00\x01\x00\x80\x00\x00".to_vec();

        let path = store
            .save(Upload {
                file_name: "small.gif".to_string(),
                content_type: Some("image/gif".to_string()),
                bytes: bytes.clone(),
            })
            .await
            .unwrap();

        assert_eq!(store.read(&path).await.unwrap(), bytes);
        assert!(dir.path().join(&path).is_file());
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn test_open_creates_nested_root() {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path().join("media").join("uploads");

        let store = FsMediaStore::open(&root).await.unwrap();

        assert!(root.is_dir());
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().expect("temp dir");
        let store = FsMediaStore::open(dir.path()).await.unwrap();

        let result = store.read("posts/missing.gif").await;
        assert!(matches!(result, Err(MediaError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_read_rejects_traversal() {
        let dir = TempDir::new().expect("temp dir");
        let store = FsMediaStore::open(dir.path()).await.unwrap();

        let result = store.read("../secret").await;
        assert!(matches!(result, Err(MediaError::InvalidPath(_))));
    }
}
