//! Rendered page cache with explicit clear.

use std::future::Future;
use std::sync::Arc;

use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

pub const CACHE_HITS: &str = "postboard_page_cache_hit_total";
pub const CACHE_MISSES: &str = "postboard_page_cache_miss_total";

/// Memoizes rendered pages for a bounded time window.
///
/// Writes to the store never invalidate anything: a cached page stays as it
/// was rendered until its TTL passes or [`Self::invalidate_all`] runs. Backend
/// failures fall back to rendering.
pub struct PageCacheService {
    cache: Arc<dyn CacheService>,
    ttl_seconds: u64,
}

impl PageCacheService {
    pub fn new(cache: Arc<dyn CacheService>, ttl_seconds: u64) -> Self {
        Self { cache, ttl_seconds }
    }

    /// Returns the stored rendering for `key`, or renders, stores and returns
    /// a fresh one.
    ///
    /// # Errors
    ///
    /// Only errors from `render` propagate.
    pub async fn get_or_render<F, Fut>(&self, key: &str, render: F) -> Result<String, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, AppError>>,
    {
        match self.cache.get_page(key).await {
            Ok(Some(content)) => {
                metrics::counter!(CACHE_HITS).increment(1);
                tracing::debug!(key, "Page cache hit");
                return Ok(content);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key, "Page cache read failed: {}", e),
        }

        metrics::counter!(CACHE_MISSES).increment(1);
        tracing::debug!(key, "Page cache miss");

        let content = render().await?;

        if let Err(e) = self
            .cache
            .set_page(key, &content, Some(self.ttl_seconds))
            .await
        {
            tracing::warn!(key, "Page cache write failed: {}", e);
        }

        Ok(content)
    }

    /// Drops every cached page.
    pub async fn invalidate_all(&self) -> Result<(), AppError> {
        self.cache.clear().await?;
        tracing::info!(backend = self.cache.backend_name(), "Page cache cleared");
        Ok(())
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    pub async fn health_check(&self) -> bool {
        self.cache.health_check().await
    }
}
