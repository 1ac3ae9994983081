//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and media storage.
//!
//! # Modules
//!
//! - [`cache`] - Page cache backends (in-process, Redis, no-op)
//! - [`media`] - Uploaded image storage (filesystem, in-process)
//! - [`persistence`] - PostgreSQL and in-process repository implementations

pub mod cache;
pub mod media;
pub mod persistence;
