//! Session ticket configuration.

use serde::{Deserialize, Serialize};

/// Smallest accepted nonce length in bytes (128 bits).
pub const MIN_NONCE_BYTES: usize = 16;

/// Session ticket store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// First segment of every session key. Must not contain `_`.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Random bytes in each session key nonce.
    #[serde(default = "default_nonce_bytes")]
    pub nonce_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            nonce_bytes: default_nonce_bytes(),
        }
    }
}

fn default_key_prefix() -> String {
    "SessionTicket".to_string()
}

fn default_nonce_bytes() -> usize {
    32
}
