//! Redis cache provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

use crate::keys;

use super::client::RedisClient;

/// Redis-backed cache provider.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    /// Redis client.
    client: RedisClient,
    /// Default TTL.
    default_ttl: Duration,
    /// `COUNT` hint for each `SCAN` page.
    scan_batch_size: u32,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider.
    pub fn new(client: RedisClient, default_ttl_seconds: u64, scan_batch_size: u32) -> Self {
        Self {
            client,
            default_ttl: Duration::from_secs(default_ttl_seconds),
            scan_batch_size: scan_batch_size.max(1),
        }
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let result: Option<Vec<u8>> = self
            .client
            .bounded("GET", redis::cmd("GET").arg(&full_key).query_async(&mut conn))
            .await?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        // PX rejects zero; an already-elapsed expiry still has to land and vanish.
        let millis = ttl.as_millis().clamp(1, u64::MAX as u128) as u64;
        let _: () = self
            .client
            .bounded(
                "SET",
                redis::cmd("SET")
                    .arg(&full_key)
                    .arg(value)
                    .arg("PX")
                    .arg(millis)
                    .query_async(&mut conn),
            )
            .await?;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &[u8]) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let _: i64 = self
            .client
            .bounded("DEL", redis::cmd("DEL").arg(&full_key).query_async(&mut conn))
            .await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut()?;
        let result: bool = self
            .client
            .bounded(
                "EXISTS",
                redis::cmd("EXISTS").arg(&full_key).query_async(&mut conn),
            )
            .await?;
        Ok(result)
    }

    async fn scan_keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        // The namespace is a literal; only the caller's pattern is a glob.
        let full_pattern = keys::namespaced_pattern(self.client.prefix(), pattern);
        let mut conn = self.client.conn_mut()?;

        // SCAN instead of KEYS so a large keyspace never blocks the server.
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = self
                .client
                .bounded(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&full_pattern)
                        .arg("COUNT")
                        .arg(self.scan_batch_size)
                        .query_async(&mut conn),
                )
                .await?;

            keys.extend(
                batch
                    .iter()
                    .map(|key| self.client.unprefixed_key(key).to_string()),
            );

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once across pages.
        keys.sort_unstable();
        keys.dedup();

        debug!(pattern, count = keys.len(), "Scanned keys matching pattern");
        Ok(keys)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut()?;
        let pong: String = self
            .client
            .bounded("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(pong == "PONG")
    }

    async fn close(&self) -> AppResult<bool> {
        self.client.close()
    }
}
