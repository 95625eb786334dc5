//! JWT creation signed with the repository's RSA key.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use warden_core::config::signing::{MAX_TOKEN_TTL_MINUTES, SigningConfig};
use warden_core::error::AppError;
use warden_core::result::AppResult;

use crate::signing::SigningKeyRepository;

use super::claims::TokenClaims;

/// A signed token and when it stops being valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Creates signed access tokens for authenticated owners.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<SigningKeyRepository>,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer from signing configuration.
    ///
    /// The lifetime is clamped to `1..=MAX_TOKEN_TTL_MINUTES`.
    pub fn new(config: &SigningConfig, keys: Arc<SigningKeyRepository>) -> Self {
        let minutes = config.token_ttl_minutes.clamp(1, MAX_TOKEN_TTL_MINUTES);
        Self {
            keys,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: Duration::minutes(minutes as i64),
        }
    }

    /// The key repository tokens are signed with.
    pub fn keys(&self) -> &Arc<SigningKeyRepository> {
        &self.keys
    }

    /// Issue a token whose subject is `owner_id`.
    pub async fn issue(&self, owner_id: Uuid) -> AppResult<IssuedToken> {
        let credential = self.keys.signing_credential().await?;

        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = TokenClaims {
            sub: owner_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        // RSA signing is CPU-bound.
        let token = tokio::task::spawn_blocking(move || credential.sign(&claims))
            .await
            .map_err(|e| AppError::internal(format!("Token signing task failed: {e}")))??;

        debug!(owner_id = %owner_id, "Issued access token");
        Ok(IssuedToken { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

    use super::*;

    fn issuer() -> TokenIssuer {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/plain");
        let keys = Arc::new(SigningKeyRepository::new(fixture, None));
        TokenIssuer::new(&SigningConfig::default(), keys)
    }

    #[tokio::test]
    async fn test_issued_token_verifies_with_published_jwk() {
        let issuer = issuer();
        let owner_id = Uuid::new_v4();
        let issued = issuer.issue(owner_id).await.unwrap();
        let jwk = issuer.keys().public_jwk().await.unwrap();

        let header = decode_header(&issued.token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some(jwk.kid.as_str()));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["warden"]);
        validation.set_issuer(&["http://localhost:5500/"]);
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).unwrap();
        let data = decode::<TokenClaims>(&issued.token, &key, &validation).unwrap();

        assert_eq!(data.claims.owner_id(), owner_id);
        assert_eq!(data.claims.exp - data.claims.iat, 600);
        assert!(!data.claims.is_expired());
        assert_eq!(data.claims.expires_at().unwrap().timestamp(), issued.expires_at.timestamp());
    }

    #[tokio::test]
    async fn test_token_ids_are_unique() {
        let issuer = issuer();
        let owner_id = Uuid::new_v4();
        let a = issuer.issue(owner_id).await.unwrap();
        let b = issuer.issue(owner_id).await.unwrap();
        assert_ne!(a.token, b.token);
    }

    #[tokio::test]
    async fn test_wrong_audience_rejected() {
        let issuer = issuer();
        let issued = issuer.issue(Uuid::new_v4()).await.unwrap();
        let jwk = issuer.keys().public_jwk().await.unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["someone-else"]);
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).unwrap();
        assert!(decode::<TokenClaims>(&issued.token, &key, &validation).is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_is_clamped() {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/plain");
        let keys = Arc::new(SigningKeyRepository::new(fixture, None));
        let config = SigningConfig {
            token_ttl_minutes: u64::MAX,
            ..SigningConfig::default()
        };
        let issuer = TokenIssuer::new(&config, keys);
        assert_eq!(issuer.ttl, Duration::minutes(MAX_TOKEN_TTL_MINUTES as i64));

        let issued = issuer.issue(Uuid::new_v4()).await.unwrap();
        assert!(issued.expires_at <= Utc::now() + Duration::days(7));
    }

    #[tokio::test]
    async fn test_missing_key_fails_issue() {
        let dir = tempfile::tempdir().unwrap();
        let keys = Arc::new(SigningKeyRepository::new(dir.path(), None));
        let issuer = TokenIssuer::new(&SigningConfig::default(), keys);
        assert!(issuer.issue(Uuid::new_v4()).await.is_err());
    }
}
