//! Shared setup for warden-auth integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use warden_auth::AuthContext;
use warden_auth::password::{HashParams, HashSecret, PasswordHasher};
use warden_auth::session::{Principal, SessionKey, SessionTicket};
use warden_auth::signing::SigningKeyRepository;
use warden_cache::CacheManager;
use warden_core::config::AppConfig;

/// Cheap Argon2 parameters so tests do not allocate 256 MiB per hash.
pub const LIGHT_PARAMS: HashParams = HashParams {
    memory_kib: 1024,
    iterations: 1,
    parallelism: 1,
    output_len: 32,
    salt_len: 16,
};

/// Path of a PEM fixture directory.
pub fn fixture_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// A fully initialized context over the in-memory cache.
pub struct TestApp {
    pub config: AppConfig,
    pub ctx: AuthContext,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = AppConfig::default();
        let cache = Arc::new(CacheManager::new(&config.cache).await.unwrap());
        Self::with_cache(config, cache).await
    }

    pub async fn with_cache(config: AppConfig, cache: Arc<CacheManager>) -> Self {
        let ctx = AuthContext::with_credentials(
            &config,
            cache,
            HashSecret::from_bytes(b"integration-secret".to_vec()),
            SigningKeyRepository::new(fixture_dir("plain"), None),
        )
        .await
        .unwrap();
        Self { config, ctx }
    }

    /// A hasher sharing nothing with the context but using light parameters.
    pub fn light_hasher(&self) -> PasswordHasher {
        PasswordHasher::with_params(
            Arc::new(HashSecret::from_bytes(b"integration-secret".to_vec())),
            LIGHT_PARAMS,
            2,
        )
    }

    /// Store a one-hour ticket for `owner` and return its key.
    pub async fn login(&self, owner: Uuid) -> SessionKey {
        let ticket = SessionTicket::new("Identity.Application", Principal::new(owner))
            .expires_at(Utc::now() + Duration::hours(1));
        self.ctx.sessions.store(&ticket).await.unwrap()
    }
}
