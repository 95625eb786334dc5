//! Cache-backed storage of single session tickets.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use warden_cache::CacheManager;
use warden_core::config::session::SessionConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

use super::codec::SessionTicketCodec;
use super::key::SessionKey;
use super::ticket::SessionTicket;

/// Stores, renews, retrieves and removes session tickets.
///
/// Each ticket lives under its own [`SessionKey`]; the cache entry expires
/// together with the ticket.
#[derive(Debug, Clone)]
pub struct SessionTicketStore {
    cache: Arc<CacheManager>,
    codec: SessionTicketCodec,
    key_prefix: String,
    nonce_bytes: usize,
}

impl SessionTicketStore {
    /// Creates a store over `cache`.
    pub fn new(cache: Arc<CacheManager>, config: &SessionConfig) -> Self {
        Self {
            cache,
            codec: SessionTicketCodec,
            key_prefix: config.key_prefix.clone(),
            nonce_bytes: config.nonce_bytes,
        }
    }

    /// Parse a session credential presented by a client.
    pub fn parse_key(&self, raw: &str) -> Option<SessionKey> {
        SessionKey::parse(raw, &self.key_prefix)
    }

    /// Store a new ticket and return the key it was stored under.
    pub async fn store(&self, ticket: &SessionTicket) -> AppResult<SessionKey> {
        let key = SessionKey::generate(&self.key_prefix, ticket.owner_id(), self.nonce_bytes)?;
        self.write(&key, ticket).await?;
        debug!(owner_id = %key.owner_id(), "Stored session ticket");
        Ok(key)
    }

    /// Overwrite the ticket at `key` and restart its expiry.
    ///
    /// Only an existing entry is renewed; a key that was never stored, or
    /// has expired or been revoked, fails with a validation error.
    pub async fn renew(&self, key: &SessionKey, ticket: &SessionTicket) -> AppResult<()> {
        if key.owner_id() != ticket.owner_id() {
            return Err(AppError::validation(
                "Session ticket owner does not match the session key",
            ));
        }
        if !self.cache.exists(key.as_str()).await? {
            return Err(AppError::validation("Session ticket to renew does not exist"));
        }
        self.write(key, ticket).await?;
        debug!(owner_id = %key.owner_id(), "Renewed session ticket");
        Ok(())
    }

    /// Read the ticket at `key`. A missing entry is `None`.
    pub async fn retrieve(&self, key: &SessionKey) -> AppResult<Option<SessionTicket>> {
        match self.cache.get(key.as_str()).await? {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Delete the ticket at `key`. Removing a missing key succeeds.
    pub async fn remove(&self, key: &SessionKey) -> AppResult<()> {
        self.cache.delete(key.as_str()).await?;
        debug!(owner_id = %key.owner_id(), "Removed session ticket");
        Ok(())
    }

    async fn write(&self, key: &SessionKey, ticket: &SessionTicket) -> AppResult<()> {
        let bytes = self.codec.encode(ticket)?;
        match ticket.properties.expires_at {
            Some(expires_at) => {
                // Already-expired tickets get the shortest TTL the cache accepts.
                let ttl = (expires_at - Utc::now())
                    .to_std()
                    .unwrap_or(Duration::from_millis(1));
                self.cache.set(key.as_str(), &bytes, ttl).await
            }
            None => self.cache.set_default(key.as_str(), &bytes).await,
        }
    }
}
