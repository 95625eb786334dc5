//! Cache provider trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for cache backends (Redis or in-memory).
///
/// Values are opaque byte strings. The provider is responsible for key
/// namespacing, TTL enforcement, and bounding every operation in time.
/// Once [`CacheProvider::close`] has run, every other method must fail
/// with [`ErrorKind::Cache`](crate::error::ErrorKind::Cache).
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>>;

    /// Set a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> AppResult<()>;

    /// Set a value with the provider's default TTL.
    async fn set_default(&self, key: &str, value: &[u8]) -> AppResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists in the cache.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Enumerate keys matching a glob pattern (`*`, `?`, `\` escapes).
    ///
    /// Keys are returned without the provider's namespace prefix so they can
    /// be passed straight back to [`CacheProvider::delete`].
    async fn scan_keys(&self, pattern: &str) -> AppResult<Vec<String>>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Release the underlying client. Returns `true` if this call released
    /// it and `false` if it had already been released.
    async fn close(&self) -> AppResult<bool>;
}
