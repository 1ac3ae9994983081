//! Media store trait, upload type and error types.

use async_trait::async_trait;

/// Errors raised by media storage.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media file not found: {0}")]
    NotFound(String),
    #[error("invalid media path: {0}")]
    InvalidPath(String),
    #[error("media I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// An uploaded file as received from a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Lowercased extension of the original file name, restricted to
    /// alphanumerics so it is safe to reuse in a stored path.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext)
    }
}

/// Storage for uploaded post images.
///
/// `read(save(upload))` must return exactly `upload.bytes`.
///
/// # Implementations
///
/// - [`crate::infrastructure::media::FsMediaStore`] - Files under `MEDIA_ROOT`
/// - [`crate::infrastructure::media::MemoryMediaStore`] - In-process map
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Stores an upload and returns its relative path (e.g. `posts/abc.gif`).
    async fn save(&self, upload: Upload) -> MediaResult<String>;

    /// Reads back a stored file.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::InvalidPath`] for paths escaping the store and
    /// [`MediaError::NotFound`] for unknown files.
    async fn read(&self, path: &str) -> MediaResult<Vec<u8>>;

    /// Checks that the store is usable.
    async fn health_check(&self) -> bool;
}

/// Rejects absolute paths, parent components and anything outside
/// `[A-Za-z0-9._-/]`.
pub fn validate_media_path(path: &str) -> MediaResult<()> {
    let valid = !path.is_empty()
        && !path.starts_with('/')
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/'))
        && path
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");

    if valid {
        Ok(())
    } else {
        Err(MediaError::InvalidPath(path.to_string()))
    }
}

/// Builds a fresh storage path for an upload under `posts/`.
pub fn new_media_path(upload: &Upload) -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    let name: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();

    match upload.extension() {
        Some(ext) => format!("posts/{}.{}", name, ext),
        None => format!("posts/{}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: Some("image/gif".to_string()),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(upload("small.gif").extension().as_deref(), Some("gif"));
        assert_eq!(upload("PHOTO.JPG").extension().as_deref(), Some("jpg"));
        assert_eq!(upload("noext").extension(), None);
        assert_eq!(upload("weird.g/f").extension(), None);
    }

    #[test]
    fn test_new_media_path_keeps_extension() {
        let path = new_media_path(&upload("small.gif"));
        assert!(path.starts_with("posts/"));
        assert!(path.ends_with(".gif"));
        assert!(validate_media_path(&path).is_ok());
    }

    #[test]
    fn test_new_media_path_is_unique() {
        let a = new_media_path(&upload("a.png"));
        let b = new_media_path(&upload("a.png"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_media_path_rejects_traversal() {
        assert!(validate_media_path("posts/a.gif").is_ok());
        assert!(validate_media_path("../etc/passwd").is_err());
        assert!(validate_media_path("posts/../../x").is_err());
        assert!(validate_media_path("/etc/passwd").is_err());
        assert!(validate_media_path("posts//a.gif").is_err());
        assert!(validate_media_path("").is_err());
        assert!(validate_media_path("posts/a b.gif").is_err());
    }
}
