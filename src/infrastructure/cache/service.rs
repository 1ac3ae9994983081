//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Keyed store for rendered page fragments with per-entry TTL.
///
/// Implementations must be thread-safe. Failures of the backing store should
/// degrade to cache misses, never to failed requests.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process map, the default
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed, shared between instances
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves a stored rendering.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(content))` on cache hit
    /// - `Ok(None)` on miss, expiry, or backend error (fail-open behavior)
    async fn get_page(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a rendering with an optional TTL.
    ///
    /// # Arguments
    ///
    /// - `key` - Full request path including query string
    /// - `content` - Rendered content
    /// - `ttl_seconds` - TTL in seconds (implementation default if None)
    async fn set_page(&self, key: &str, content: &str, ttl_seconds: Option<u64>)
    -> CacheResult<()>;

    /// Drops every stored rendering.
    ///
    /// Readers never observe a partially cleared cache.
    async fn clear(&self) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name for logs and health reports.
    fn backend_name(&self) -> &'static str;
}
