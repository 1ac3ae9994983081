//! In-process media store.

use super::service::{MediaError, MediaResult, MediaStore, Upload, new_media_path, validate_media_path};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keeps uploads in memory. Used with the in-process entity store and in tests.
#[derive(Default)]
pub struct MemoryMediaStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn save(&self, upload: Upload) -> MediaResult<String> {
        let path = new_media_path(&upload);
        self.files.write().await.insert(path.clone(), upload.bytes);
        Ok(path)
    }

    async fn read(&self, path: &str) -> MediaResult<Vec<u8>> {
        validate_media_path(path)?;
        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| MediaError::NotFound(path.to_string()))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
