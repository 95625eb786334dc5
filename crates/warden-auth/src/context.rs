//! The authentication core, built once at startup.

use std::sync::Arc;

use tracing::info;

use warden_cache::CacheManager;
use warden_core::config::AppConfig;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

use crate::password::{HashSecret, PasswordHasher};
use crate::session::{SessionIndex, SessionTicketStore};
use crate::signing::SigningKeyRepository;
use crate::token::TokenIssuer;

/// Every component of the authentication core, wired to one cache and one
/// set of credentials.
///
/// Construct it once with [`AuthContext::initialize`] and share it by `Arc`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Keyed Argon2id hasher.
    pub hasher: PasswordHasher,
    /// RSA signing key.
    pub keys: Arc<SigningKeyRepository>,
    /// Access token issuer.
    pub tokens: TokenIssuer,
    /// Single-ticket session storage.
    pub sessions: SessionTicketStore,
    /// Per-owner session revocation.
    pub index: SessionIndex,
    cache: Arc<CacheManager>,
}

impl AuthContext {
    /// Build the context and load every credential.
    ///
    /// A missing hash secret or an unusable signing key fails here, so the
    /// service never starts without them.
    pub async fn initialize(config: &AppConfig, cache: Arc<CacheManager>) -> AppResult<Self> {
        let secret = Arc::new(HashSecret::from_env(config.password.secret_env.as_str()));
        let keys = Arc::new(SigningKeyRepository::from_config(&config.signing));
        Self::assemble(config, cache, secret, keys).await
    }

    /// Build the context from explicit credentials instead of the
    /// configured environment variables.
    pub async fn with_credentials(
        config: &AppConfig,
        cache: Arc<CacheManager>,
        secret: HashSecret,
        keys: SigningKeyRepository,
    ) -> AppResult<Self> {
        Self::assemble(config, cache, Arc::new(secret), Arc::new(keys)).await
    }

    async fn assemble(
        config: &AppConfig,
        cache: Arc<CacheManager>,
        secret: Arc<HashSecret>,
        keys: Arc<SigningKeyRepository>,
    ) -> AppResult<Self> {
        config.validate()?;

        secret.expose()?;
        let material = keys.key_material().await?;
        info!(kid = %material.jwk().kid, "Authentication credentials loaded");

        Ok(Self {
            hasher: PasswordHasher::new(secret, config.password.max_concurrent_hashes),
            tokens: TokenIssuer::new(&config.signing, Arc::clone(&keys)),
            keys,
            sessions: SessionTicketStore::new(Arc::clone(&cache), &config.session),
            index: SessionIndex::new(Arc::clone(&cache), &config.session),
            cache,
        })
    }

    /// The shared cache.
    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// Release the cache client. Later session operations fail.
    pub async fn shutdown(&self) -> AppResult<()> {
        if self.cache.close().await? {
            info!("Authentication context shut down");
        }
        Ok(())
    }
}
