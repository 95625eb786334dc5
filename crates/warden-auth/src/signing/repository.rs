//! Lazily loaded RSA signing key.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::{RsaPrivateKey, RsaPublicKey};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use warden_core::config::signing::SigningConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;

use super::jwk::{Jwk, Jwks};
use super::loader;

/// Algorithm advertised in the JWK and used for every signature.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

const SIGNING_ALGORITHM_NAME: &str = "RS256";

/// Private key wrapped for token signing, tagged with its key id.
#[derive(Clone)]
pub struct SigningCredential {
    /// Key id placed in the token header.
    pub kid: String,
    /// Signature algorithm.
    pub algorithm: Algorithm,
    key: EncodingKey,
}

impl SigningCredential {
    /// Header for tokens signed with this credential.
    pub fn header(&self) -> Header {
        let mut header = Header::new(self.algorithm);
        header.kid = Some(self.kid.clone());
        header
    }

    /// Serialize and sign `claims` as a compact JWT.
    pub fn sign<T: Serialize>(&self, claims: &T) -> AppResult<String> {
        jsonwebtoken::encode(&self.header(), claims, &self.key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredential")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Key material derived once from the PEM credential.
pub struct RsaKeyMaterial {
    source: PathBuf,
    public_key: RsaPublicKey,
    jwk: Jwk,
    credential: SigningCredential,
}

impl RsaKeyMaterial {
    /// Derive the public JWK and signing credential from a private key.
    pub fn from_private_key(source: PathBuf, private_key: &RsaPrivateKey) -> AppResult<Self> {
        let public_key = RsaPublicKey::from(private_key);
        let jwk = Jwk::from_rsa_public_key(&public_key, SIGNING_ALGORITHM_NAME);

        let der = private_key
            .to_pkcs1_der()
            .map_err(|e| AppError::credential(format!("Failed to encode signing key: {e}")))?;
        let credential = SigningCredential {
            kid: jwk.kid.clone(),
            algorithm: SIGNING_ALGORITHM,
            key: EncodingKey::from_rsa_der(der.as_bytes()),
        };

        Ok(Self {
            source,
            public_key,
            jwk,
            credential,
        })
    }

    /// Find, decode and derive in one blocking step.
    fn load(dir: &Path, passphrase: Option<&SecretString>) -> AppResult<Self> {
        let (source, private_key) = loader::load_private_key(dir, passphrase)?;
        Self::from_private_key(source, &private_key)
    }

    /// File the key was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The public half of the key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// The public key as a JWK.
    pub fn jwk(&self) -> &Jwk {
        &self.jwk
    }

    /// The signing credential.
    pub fn credential(&self) -> &SigningCredential {
        &self.credential
    }
}

impl fmt::Debug for RsaKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyMaterial")
            .field("source", &self.source)
            .field("kid", &self.jwk.kid)
            .finish_non_exhaustive()
    }
}

/// Owns the RSA signing key for the process lifetime.
///
/// The key is read on first use. Concurrent first callers share one load
/// and every caller observes the same material afterwards. A failed load
/// is returned to every waiting caller and retried by the next one.
#[derive(Debug)]
pub struct SigningKeyRepository {
    key_dir: PathBuf,
    passphrase: Option<SecretString>,
    material: OnceCell<RsaKeyMaterial>,
    load_attempts: AtomicUsize,
}

impl SigningKeyRepository {
    /// Create a repository reading from `key_dir`, decrypting with
    /// `passphrase` when one is given.
    pub fn new(key_dir: impl Into<PathBuf>, passphrase: Option<SecretString>) -> Self {
        Self {
            key_dir: key_dir.into(),
            passphrase,
            material: OnceCell::new(),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Create a repository from configuration. The passphrase is read from
    /// the configured environment variable; unset or empty means plaintext.
    pub fn from_config(config: &SigningConfig) -> Self {
        let passphrase = std::env::var(&config.passphrase_env)
            .ok()
            .filter(|value| !value.is_empty())
            .map(SecretString::from);
        debug!(
            key_dir = %config.key_dir,
            encrypted = passphrase.is_some(),
            "Configured signing key repository"
        );
        Self::new(&config.key_dir, passphrase)
    }

    /// The directory searched for the key.
    pub fn key_dir(&self) -> &Path {
        &self.key_dir
    }

    /// Whether the key has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.material.initialized()
    }

    /// How many times the key file has been read, failed reads included.
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::Relaxed)
    }

    /// The key material, loading it on first call.
    pub async fn key_material(&self) -> AppResult<&RsaKeyMaterial> {
        self.material.get_or_try_init(|| self.load()).await
    }

    /// The public key as a JWK. The `kid` is stable for the process lifetime.
    pub async fn public_jwk(&self) -> AppResult<Jwk> {
        Ok(self.key_material().await?.jwk().clone())
    }

    /// The JWKS document containing the public key.
    pub async fn jwks(&self) -> AppResult<Jwks> {
        Ok(Jwks::single(self.public_jwk().await?))
    }

    /// The private key wrapped for signing.
    pub async fn signing_credential(&self) -> AppResult<SigningCredential> {
        Ok(self.key_material().await?.credential().clone())
    }

    async fn load(&self) -> AppResult<RsaKeyMaterial> {
        let attempt = self.load_attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let dir = self.key_dir.clone();
        let passphrase = self
            .passphrase
            .as_ref()
            .map(|p| SecretString::from(p.expose_secret().to_owned()));

        let material = tokio::task::spawn_blocking(move || {
            RsaKeyMaterial::load(&dir, passphrase.as_ref())
        })
        .await
        .map_err(|e| AppError::internal(format!("Signing key load task failed: {e}")))??;

        info!(
            source = %material.source().display(),
            kid = %material.jwk().kid,
            attempt,
            "Signing key loaded"
        );
        Ok(material)
    }
}
