//! Keyed Argon2id password hashing and verification.

use std::sync::Arc;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::{Algorithm, Argon2};
use subtle::ConstantTimeEq;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use warden_core::error::AppError;
use warden_core::result::AppResult;

use super::codec::{self, EncodedHash};
use super::params::{ARGON2_VERSION, HashParams};
use super::secret::HashSecret;

/// Outcome of checking a candidate password against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordVerification {
    /// The candidate reproduces the stored hash exactly.
    Success,
    /// Anything else, including malformed stored hashes.
    Failed,
}

impl PasswordVerification {
    /// Returns `true` for [`PasswordVerification::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Handles password hashing and verification using keyed Argon2id.
///
/// The synchronous methods do the raw CPU work. The async [`hash`] and
/// [`verify`] methods run that work on the blocking pool, with at most
/// `max_concurrent` computations in flight so memory use stays bounded.
///
/// [`hash`]: PasswordHasher::hash
/// [`verify`]: PasswordHasher::verify
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    secret: Arc<HashSecret>,
    params: HashParams,
    permits: Arc<Semaphore>,
}

impl PasswordHasher {
    /// Creates a hasher using [`HashParams::CURRENT`].
    pub fn new(secret: Arc<HashSecret>, max_concurrent: usize) -> Self {
        Self::with_params(secret, HashParams::CURRENT, max_concurrent)
    }

    /// Creates a hasher with an explicit parameter set.
    ///
    /// Hashes written with other parameters never verify against this
    /// hasher; keep one instance per parameter set when migrating.
    pub fn with_params(secret: Arc<HashSecret>, params: HashParams, max_concurrent: usize) -> Self {
        Self {
            secret,
            params,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// The parameter set this hasher writes and verifies with.
    pub fn params(&self) -> &HashParams {
        &self.params
    }

    /// Hashes a plaintext password with a fresh random salt. Blocks the
    /// calling thread for the full Argon2 computation.
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let mut salt = vec![0u8; self.params.salt_len];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| AppError::internal(format!("Salt generation failed: {e}")))?;

        let digest = self.derive(password.as_bytes(), &salt)?;
        Ok(codec::encode(&self.params, &salt, &digest))
    }

    /// Verifies a plaintext password against a stored hash. Blocks the
    /// calling thread for the full Argon2 computation unless the stored
    /// hash is rejected up front.
    pub fn verify_password(&self, stored: &str, candidate: &str) -> PasswordVerification {
        if stored.trim().is_empty() {
            debug!("Rejecting verification against an empty stored hash");
            return PasswordVerification::Failed;
        }

        let Some(parsed) = EncodedHash::parse(stored) else {
            debug!("Rejecting verification against a malformed stored hash");
            return PasswordVerification::Failed;
        };

        let Some(salt) = parsed.salt_bytes() else {
            debug!("Rejecting verification against a stored hash with an unreadable salt");
            return PasswordVerification::Failed;
        };

        let digest = match self.derive(candidate.as_bytes(), &salt) {
            Ok(digest) => digest,
            Err(e) => {
                warn!(error = %e, "Password digest computation failed during verification");
                return PasswordVerification::Failed;
            }
        };

        let recomputed = codec::encode(&self.params, &salt, &digest);
        if bool::from(recomputed.as_bytes().ct_eq(stored.as_bytes())) {
            PasswordVerification::Success
        } else {
            PasswordVerification::Failed
        }
    }

    /// Whether `stored` should be replaced by a fresh hash from this hasher,
    /// because it is malformed or was written with other parameters.
    ///
    /// Check after a successful login, while the plaintext is at hand. A
    /// hash from another parameter set never verifies here, so the
    /// migration has to verify with a hasher configured for the old set.
    pub fn needs_rehash(&self, stored: &str) -> bool {
        match EncodedHash::parse(stored) {
            Some(parsed) => !parsed.matches_params(&self.params),
            None => true,
        }
    }

    /// Hashes on the blocking pool.
    pub async fn hash(&self, password: String) -> AppResult<String> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| AppError::internal("Password hashing pool is closed"))?;
        let hasher = self.clone();

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            hasher.hash_password(&password)
        })
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
    }

    /// Verifies on the blocking pool. Any failure to run the check yields
    /// [`PasswordVerification::Failed`].
    pub async fn verify(&self, stored: String, candidate: String) -> PasswordVerification {
        let permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                error!("Password hashing pool is closed");
                return PasswordVerification::Failed;
            }
        };
        let hasher = self.clone();

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            hasher.verify_password(&stored, &candidate)
        })
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "Password verification task failed");
            PasswordVerification::Failed
        })
    }

    fn derive(&self, password: &[u8], salt: &[u8]) -> AppResult<Vec<u8>> {
        let secret = self.secret.expose()?;
        let argon2 = Argon2::new_with_secret(
            secret,
            Algorithm::Argon2id,
            ARGON2_VERSION,
            self.params.to_argon2()?,
        )
        .map_err(|e| AppError::internal(format!("Invalid Argon2 configuration: {e}")))?;

        let mut digest = vec![0u8; self.params.output_len];
        argon2
            .hash_password_into(password, salt, &mut digest)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        Ok(digest)
    }
}
