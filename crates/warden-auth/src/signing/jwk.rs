//! JSON Web Key representation of the public signing key.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rsa::RsaPublicKey;
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use warden_core::result::AppResult;

/// A single RSA public key in JWK form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwk {
    /// Key type, always `RSA`.
    pub kty: String,
    /// Intended use, always `sig`.
    #[serde(rename = "use")]
    pub key_use: String,
    /// Signing algorithm this key is used with.
    pub alg: String,
    /// Key id carried in the `kid` header of every token.
    pub kid: String,
    /// Public exponent, base64url without padding.
    pub e: String,
    /// Modulus, base64url without padding.
    pub n: String,
}

impl Jwk {
    /// Build the JWK for `public_key`. The `kid` is the key's RFC 7638
    /// thumbprint, so it only changes when the key does.
    pub fn from_rsa_public_key(public_key: &RsaPublicKey, alg: &str) -> Self {
        let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());
        let kid = thumbprint(&e, &n);
        Self {
            kty: "RSA".to_string(),
            key_use: "sig".to_string(),
            alg: alg.to_string(),
            kid,
            e,
            n,
        }
    }
}

/// RFC 7638 SHA-256 thumbprint over the required RSA members.
fn thumbprint(e: &str, n: &str) -> String {
    // Members in lexicographic order, no whitespace.
    let canonical = format!(r#"{{"e":"{e}","kty":"RSA","n":"{n}"}}"#);
    URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()))
}

/// A JWK Set as published to token verifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Jwks {
    /// The published keys.
    pub keys: Vec<Jwk>,
}

impl Jwks {
    /// A set holding one key.
    pub fn single(jwk: Jwk) -> Self {
        Self { keys: vec![jwk] }
    }

    /// Find a key by `kid`.
    pub fn find_by_kid(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    /// Render the document served to verifiers.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
