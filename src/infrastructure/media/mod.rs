//! Storage for uploaded post images.
//!
//! - [`FsMediaStore`] - Files under `MEDIA_ROOT` (production)
//! - [`MemoryMediaStore`] - In-process map (tests, in-memory deployments)

mod fs_media_store;
mod memory_media_store;
mod service;

pub use fs_media_store::FsMediaStore;
pub use memory_media_store::MemoryMediaStore;
pub use service::{
    MediaError, MediaResult, MediaStore, Upload, new_media_path, validate_media_path,
};
