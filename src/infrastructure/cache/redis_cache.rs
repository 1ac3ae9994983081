//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use crate::config::mask_connection_string;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

/// Redis cache implementation shared by every service instance.
///
/// Keys are namespaced by a generation counter (`page:gen`). Clearing bumps
/// the counter with a single `INCR`, which atomically orphans every stored
/// page; orphans disappear when their TTL runs out.
///
/// All lookups are fail-open: errors are logged and treated as misses.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl_seconds` - TTL applied when [`CacheService::set_page`]
    ///   is called with `ttl_seconds = None`; controlled via `CACHE_TTL_SECONDS`
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", mask_connection_string(redis_url));

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            key_prefix: "page:".to_string(),
        })
    }

    fn generation_key(&self) -> String {
        format!("{}gen", self.key_prefix)
    }

    /// Reads the current generation; a missing counter is generation 0.
    async fn generation(&self) -> redis::RedisResult<u64> {
        let mut conn = self.client.clone();
        let generation: Option<u64> = conn.get(self.generation_key()).await?;
        Ok(generation.unwrap_or(0))
    }

    /// Constructs the full Redis key for a page within a generation.
    fn build_key(&self, generation: u64, key: &str) -> String {
        format!("{}{}:{}", self.key_prefix, generation, key)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_page(&self, key: &str) -> CacheResult<Option<String>> {
        let generation = match self.generation().await {
            Ok(generation) => generation,
            Err(e) => {
                error!("Redis generation lookup failed: {}", e);
                return Ok(None);
            }
        };

        let mut conn = self.client.clone();
        match conn
            .get::<_, Option<String>>(self.build_key(generation, key))
            .await
        {
            Ok(Some(content)) => {
                debug!("Cache HIT: {}", key);
                Ok(Some(content))
            }
            Ok(None) => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set_page(
        &self,
        key: &str,
        content: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let generation = match self.generation().await {
            Ok(generation) => generation,
            Err(e) => {
                warn!("Redis generation lookup failed: {}", e);
                return Ok(());
            }
        };

        let mut conn = self.client.clone();
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        match conn
            .set_ex::<_, _, ()>(self.build_key(generation, key), content, ttl)
            .await
        {
            Ok(_) => {
                debug!("Cache SET: {} (TTL: {}s)", key, ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn clear(&self) -> CacheResult<()> {
        let mut conn = self.client.clone();

        let generation: u64 = conn
            .incr(self.generation_key(), 1)
            .await
            .map_err(|e| CacheError::OperationError(format!("Redis INCR failed: {}", e)))?;

        debug!("Cache CLEAR: now at generation {}", generation);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
