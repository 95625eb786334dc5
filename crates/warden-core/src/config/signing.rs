//! JWT signing key configuration.

use serde::{Deserialize, Serialize};

/// Longest accepted token lifetime: seven days.
pub const MAX_TOKEN_TTL_MINUTES: u64 = 7 * 24 * 60;

/// Signing key and token issuance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Directory that must contain exactly one `.pem` RSA private key.
    #[serde(default = "default_key_dir")]
    pub key_dir: String,
    /// Environment variable holding the PEM passphrase. When the variable is
    /// unset or empty the key is read as plaintext.
    #[serde(default = "default_passphrase_env")]
    pub passphrase_env: String,
    /// `iss` claim of issued tokens.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// `aud` claim of issued tokens.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Lifetime of issued tokens in minutes, `1..=MAX_TOKEN_TTL_MINUTES`.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            key_dir: default_key_dir(),
            passphrase_env: default_passphrase_env(),
            issuer: default_issuer(),
            audience: default_audience(),
            token_ttl_minutes: default_token_ttl(),
        }
    }
}

fn default_key_dir() -> String {
    "JWK".to_string()
}

fn default_passphrase_env() -> String {
    "WARDEN_JWK_PASSPHRASE".to_string()
}

fn default_issuer() -> String {
    "http://localhost:5500/".to_string()
}

fn default_audience() -> String {
    "warden".to_string()
}

fn default_token_ttl() -> u64 {
    10
}
