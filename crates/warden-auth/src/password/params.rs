//! Argon2id cost parameters.
//!
//! These values are baked into every stored hash and verification always
//! recomputes with them, so changing [`HashParams::CURRENT`] invalidates all
//! existing passwords. A migration has to verify with the old set and
//! rehash with the new one on the next successful login.

use argon2::{Params, Version};

use warden_core::error::AppError;
use warden_core::result::AppResult;

/// Argon2 version written into the encoded hash (`v=19`).
pub const ARGON2_VERSION: Version = Version::V0x13;

/// The full Argon2id parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes over memory.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
    /// Digest length in bytes.
    pub output_len: usize,
    /// Random salt length in bytes.
    pub salt_len: usize,
}

impl HashParams {
    /// Parameters used for every hash this service writes.
    pub const CURRENT: HashParams = HashParams {
        memory_kib: 256 * 1024,
        iterations: 3,
        parallelism: 4,
        output_len: 256,
        salt_len: 128,
    };

    /// Convert into the `argon2` crate's parameter type.
    pub fn to_argon2(&self) -> AppResult<Params> {
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(self.output_len),
        )
        .map_err(|e| AppError::internal(format!("Invalid Argon2 parameters: {e}")))
    }
}
