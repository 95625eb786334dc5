//! Password hashing configuration.
//!
//! The Argon2id cost parameters are deliberately absent: they are fixed in
//! code because every stored hash depends on them.

use serde::{Deserialize, Serialize};

/// Password hashing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Environment variable holding the keyed hashing secret.
    #[serde(default = "default_secret_env")]
    pub secret_env: String,
    /// Maximum number of hash computations running at once. Each one
    /// allocates the full Argon2 memory cost.
    #[serde(default = "default_max_concurrent_hashes")]
    pub max_concurrent_hashes: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            secret_env: default_secret_env(),
            max_concurrent_hashes: default_max_concurrent_hashes(),
        }
    }
}

fn default_secret_env() -> String {
    "WARDEN_HASH_SECRET".to_string()
}

fn default_max_concurrent_hashes() -> usize {
    4
}
