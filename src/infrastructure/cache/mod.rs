//! Caching layer for rendered feed pages.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`MemoryCache`] - In-process map with TTL (default)
//! - [`RedisCache`] - Redis-backed cache shared between instances
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! The get-or-render policy on top of these backends lives in
//! [`crate::application::services::PageCacheService`].

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};
