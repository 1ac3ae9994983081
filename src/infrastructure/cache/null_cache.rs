//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Every lookup misses, so every request renders fresh content. Selected with
/// `CACHE_BACKEND=none`.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_page(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_page(
        &self,
        _key: &str,
        _content: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_always_misses() {
        let cache = NullCache::new();
        cache.set_page("/", "content", None).await.unwrap();

        assert!(cache.get_page("/").await.unwrap().is_none());
        assert!(cache.health_check().await);
    }
}
