//! In-process cache implementation.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Entry bound used by [`MemoryCache::new`].
pub const DEFAULT_MAX_ENTRIES: usize = 300;

/// When full, one in this many entries is culled after expired ones go.
const CULL_FREQUENCY: usize = 3;

struct Entry {
    content: String,
    expires_at: Instant,
}

/// Page cache held in process memory.
///
/// Entries live behind a single `RwLock`: concurrent readers share the read
/// side, while [`CacheService::clear`] takes the write side, so a clear is
/// never observed half-done. Expired entries are dropped lazily on lookup.
///
/// The map never holds more than `max_entries` pages. A write of a new key
/// into a full map first drops expired entries and, if that frees nothing,
/// the third of the entries closest to expiry.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    default_ttl: Duration,
    max_entries: usize,
}

impl MemoryCache {
    /// Creates an empty cache whose entries live `default_ttl_seconds` unless
    /// a TTL is given per entry, bounded at [`DEFAULT_MAX_ENTRIES`].
    pub fn new(default_ttl_seconds: u64) -> Self {
        Self::with_max_entries(default_ttl_seconds, DEFAULT_MAX_ENTRIES)
    }

    /// Like [`Self::new`] with an explicit entry bound (`CACHE_MAX_ENTRIES`).
    pub fn with_max_entries(default_ttl_seconds: u64, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl: Duration::from_secs(default_ttl_seconds),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_page(&self, key: &str) -> CacheResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    debug!("Cache HIT: {}", key);
                    return Ok(Some(entry.content.clone()));
                }
                Some(_) => {}
                None => {
                    debug!("Cache MISS: {}", key);
                    return Ok(None);
                }
            }
        }

        // Expired: drop it, unless a writer refreshed it in the meantime.
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }
        debug!("Cache EXPIRED: {}", key);
        Ok(None)
    }

    async fn set_page(
        &self,
        key: &str,
        content: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let ttl = ttl_seconds.map_or(self.default_ttl, Duration::from_secs);
        let now = Instant::now();
        let Some(expires_at) = now.checked_add(ttl) else {
            warn!("Cache TTL of {}s is out of range, not storing {}", ttl.as_secs(), key);
            return Ok(());
        };

        let mut entries = self.entries.write().await;
        if entries.len() >= self.max_entries && !entries.contains_key(key) {
            cull(&mut entries, now, self.max_entries);
        }
        entries.insert(
            key.to_string(),
            Entry {
                content: content.to_string(),
                expires_at,
            },
        );
        debug!("Cache SET: {} (TTL: {}s)", key, ttl.as_secs());
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        debug!("Cache CLEAR: {} entries dropped", dropped);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Makes room for one more entry in a full map.
fn cull(entries: &mut HashMap<String, Entry>, now: Instant, max_entries: usize) {
    entries.retain(|_, entry| entry.expires_at > now);
    if entries.len() < max_entries {
        return;
    }

    let mut by_expiry: Vec<(Instant, String)> = entries
        .iter()
        .map(|(key, entry)| (entry.expires_at, key.clone()))
        .collect();
    by_expiry.sort_unstable();

    let drop_count = (entries.len() / CULL_FREQUENCY).max(1);
    for (_, key) in by_expiry.into_iter().take(drop_count) {
        entries.remove(&key);
    }
    debug!("Cache CULL: {} entries dropped", drop_count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new(20);
        cache.set_page("/", "<p>feed</p>", None).await.unwrap();

        assert_eq!(
            cache.get_page("/").await.unwrap().as_deref(),
            Some("<p>feed</p>")
        );
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = MemoryCache::new(20);
        cache.set_page("/", "page one", None).await.unwrap();
        cache.set_page("/?page=2", "page two", None).await.unwrap();

        assert_eq!(cache.get_page("/").await.unwrap().as_deref(), Some("page one"));
        assert_eq!(
            cache.get_page("/?page=2").await.unwrap().as_deref(),
            Some("page two")
        );
        assert!(cache.get_page("/?page=3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let cache = MemoryCache::new(20);
        cache.set_page("/", "a", None).await.unwrap();
        cache.set_page("/?page=2", "b", None).await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.is_empty().await);
        assert!(cache.get_page("/").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new(20);
        cache.set_page("/", "stale soon", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(19)).await;
        assert!(cache.get_page("/").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get_page("/").await.unwrap().is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_entry_ttl_overrides_default() {
        let cache = MemoryCache::new(20);
        cache.set_page("/", "short", Some(1)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get_page("/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_distinct_keys_stay_within_bound() {
        let cache = MemoryCache::with_max_entries(20, 30);

        for i in 0..5_000 {
            cache
                .set_page(&format!("/?junk={}", i), "feed", None)
                .await
                .unwrap();
            assert!(cache.len().await <= 30);
        }

        assert!(cache.get_page("/?junk=4999").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cache_drops_entries_closest_to_expiry() {
        let cache = MemoryCache::with_max_entries(20, 3);
        cache.set_page("/?page=1", "one", None).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.set_page("/?page=2", "two", None).await.unwrap();
        cache.set_page("/?page=3", "three", None).await.unwrap();

        cache.set_page("/?page=4", "four", None).await.unwrap();

        assert_eq!(cache.len().await, 3);
        assert!(cache.get_page("/?page=1").await.unwrap().is_none());
        assert!(cache.get_page("/?page=4").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cache_prefers_dropping_expired_entries() {
        let cache = MemoryCache::with_max_entries(20, 2);
        cache.set_page("/old", "old", Some(1)).await.unwrap();
        cache.set_page("/kept", "kept", None).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        cache.set_page("/new", "new", None).await.unwrap();

        assert!(cache.get_page("/kept").await.unwrap().is_some());
        assert!(cache.get_page("/new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwriting_a_key_in_full_cache_evicts_nothing() {
        let cache = MemoryCache::with_max_entries(20, 2);
        cache.set_page("/", "a", None).await.unwrap();
        cache.set_page("/?page=2", "b", None).await.unwrap();

        cache.set_page("/", "a2", None).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get_page("/").await.unwrap().as_deref(), Some("a2"));
    }

    #[tokio::test]
    async fn test_huge_ttl_is_not_stored() {
        let cache = MemoryCache::new(20);
        cache.set_page("/", "forever", Some(u64::MAX)).await.unwrap();

        assert!(cache.is_empty().await);
    }
}
