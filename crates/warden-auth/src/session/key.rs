//! Opaque session keys: `{prefix}_{owner_id}_{nonce}`.

use std::fmt;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use uuid::Uuid;

use warden_cache::keys::{self, SESSION_KEY_SEPARATOR};
use warden_core::config::session::MIN_NONCE_BYTES;
use warden_core::error::AppError;
use warden_core::result::AppResult;

/// The cache key of one session ticket, handed to clients as their
/// session credential.
///
/// The nonce alone authenticates the bearer, so `Debug` leaves it out.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    value: String,
    owner_id: Uuid,
}

impl SessionKey {
    /// A fresh key for `owner_id` with `nonce_bytes` random bytes.
    pub fn generate(prefix: &str, owner_id: Uuid, nonce_bytes: usize) -> AppResult<Self> {
        if nonce_bytes < MIN_NONCE_BYTES {
            return Err(AppError::validation(format!(
                "Session nonce must be at least {MIN_NONCE_BYTES} bytes, got {nonce_bytes}"
            )));
        }

        let mut nonce = vec![0u8; nonce_bytes];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| AppError::internal(format!("Session nonce generation failed: {e}")))?;

        Ok(Self {
            value: keys::session_ticket(prefix, owner_id, &URL_SAFE_NO_PAD.encode(&nonce)),
            owner_id,
        })
    }

    /// Parse a key previously produced with `prefix`. Returns `None` for
    /// anything that is not a well-formed key under that prefix.
    ///
    /// The owner segment must be the lowercase hyphenated form that
    /// [`SessionKey::generate`] writes; any other spelling of the same id
    /// would sit outside the owner's scan pattern.
    pub fn parse(raw: &str, prefix: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, SESSION_KEY_SEPARATOR);
        if parts.next()? != prefix {
            return None;
        }
        let segment = parts.next()?;
        let owner_id = Uuid::parse_str(segment).ok()?;
        if owner_id.hyphenated().encode_lower(&mut Uuid::encode_buffer()) != segment {
            return None;
        }
        let nonce = parts.next()?;
        if nonce.is_empty() {
            return None;
        }
        Some(Self {
            value: raw.to_string(),
            owner_id,
        })
    }

    /// The owning identity.
    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// The full key.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Consume into the full key string.
    pub fn into_string(self) -> String {
        self.value
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("owner_id", &self.owner_id)
            .finish_non_exhaustive()
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
