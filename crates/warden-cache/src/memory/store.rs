//! In-memory cache implementation using the moka crate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use warden_core::config::cache::MemoryCacheConfig;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

use crate::handle::ClientHandle;
use crate::keys::glob_matches;

/// A cached value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Arc<[u8]>,
    ttl: Duration,
}

/// Per-entry expiry: every write (re)starts the entry's own TTL.
struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Arc<ClientHandle<Cache<String, CacheEntry>>>,
    /// Default TTL for entries.
    default_ttl: Duration,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry)
            .build();

        Self {
            cache: Arc::new(ClientHandle::new("memory cache", cache)),
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let cache = self.cache.acquire()?;
        Ok(cache.get(key).await.map(|entry| entry.value.to_vec()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> AppResult<()> {
        let cache = self.cache.acquire()?;
        let entry = CacheEntry {
            value: Arc::from(value),
            ttl,
        };
        cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &[u8]) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let cache = self.cache.acquire()?;
        cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let cache = self.cache.acquire()?;
        Ok(cache.contains_key(key))
    }

    async fn scan_keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let cache = self.cache.acquire()?;
        let keys: Vec<String> = cache
            .iter()
            .filter(|(key, _)| glob_matches(pattern, key))
            .map(|(key, _)| key.to_string())
            .collect();

        debug!(pattern, count = keys.len(), "Scanned keys matching pattern");
        Ok(keys)
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.cache.acquire()?;
        Ok(true)
    }

    async fn close(&self) -> AppResult<bool> {
        self.cache.release()
    }
}
