//! Encoding of password hashes:
//! `$argon2id$v=19$m=<KiB>,t=<iterations>,p=<parallelism>$<salt>$<digest>`.
//!
//! Salt and digest use standard padded base64. Parsing is deliberately
//! lenient about field *contents*: verification re-encodes and compares the
//! whole string, so only the field count and the salt need to be readable.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::params::{ARGON2_VERSION, HashParams};

/// Algorithm identifier in the first field.
pub const ALGORITHM_ID: &str = "argon2id";

/// Field delimiter.
pub const DELIMITER: char = '$';

/// Number of non-empty fields in a well-formed hash.
pub const FIELD_COUNT: usize = 5;

/// Build the encoded string for a computed digest.
pub fn encode(params: &HashParams, salt: &[u8], digest: &[u8]) -> String {
    format!(
        "{DELIMITER}{ALGORITHM_ID}{DELIMITER}v={}{DELIMITER}m={},t={},p={}{DELIMITER}{}{DELIMITER}{}",
        ARGON2_VERSION as u32,
        params.memory_kib,
        params.iterations,
        params.parallelism,
        STANDARD.encode(salt),
        STANDARD.encode(digest),
    )
}

/// Cost parameters read back from an encoded hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedCost {
    /// `m=` memory cost in KiB.
    pub memory_kib: u32,
    /// `t=` iterations.
    pub iterations: u32,
    /// `p=` parallelism.
    pub parallelism: u32,
}

impl From<&HashParams> for EncodedCost {
    fn from(params: &HashParams) -> Self {
        Self {
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
        }
    }
}

/// A stored hash split into its five fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedHash<'a> {
    /// Algorithm identifier, normally `argon2id`.
    pub algorithm: &'a str,
    /// Version field, normally `v=19`.
    pub version: &'a str,
    /// Comma-joined parameter block.
    pub params: &'a str,
    /// Base64 salt.
    pub salt: &'a str,
    /// Base64 digest.
    pub digest: &'a str,
}

impl<'a> EncodedHash<'a> {
    /// Split `encoded` on `$`, ignoring empty segments. Returns `None` unless
    /// exactly five fields remain.
    pub fn parse(encoded: &'a str) -> Option<Self> {
        let mut fields = encoded.split(DELIMITER).filter(|f| !f.is_empty());
        let parsed = Self {
            algorithm: fields.next()?,
            version: fields.next()?,
            params: fields.next()?,
            salt: fields.next()?,
            digest: fields.next()?,
        };
        if fields.next().is_some() {
            return None;
        }
        Some(parsed)
    }

    /// Decode the salt field. Non-canonical base64 is rejected.
    pub fn salt_bytes(&self) -> Option<Vec<u8>> {
        STANDARD.decode(self.salt).ok()
    }

    /// Decode the digest field.
    pub fn digest_bytes(&self) -> Option<Vec<u8>> {
        STANDARD.decode(self.digest).ok()
    }

    /// Whether this hash was written by Argon2id with exactly `params`.
    pub fn matches_params(&self, params: &HashParams) -> bool {
        self.algorithm == ALGORITHM_ID
            && self.version == format!("v={}", ARGON2_VERSION as u32)
            && self.cost() == Some(EncodedCost::from(params))
            && self.salt_bytes().map(|salt| salt.len()) == Some(params.salt_len)
            && self.digest_bytes().map(|digest| digest.len()) == Some(params.output_len)
    }

    /// Parse the `m=..,t=..,p=..` block.
    pub fn cost(&self) -> Option<EncodedCost> {
        let (mut m, mut t, mut p) = (None, None, None);
        for pair in self.params.split(',') {
            let (name, value) = pair.split_once('=')?;
            let value: u32 = value.parse().ok()?;
            let slot = match name {
                "m" => &mut m,
                "t" => &mut t,
                "p" => &mut p,
                _ => return None,
            };
            if slot.replace(value).is_some() {
                return None;
            }
        }
        Some(EncodedCost {
            memory_kib: m?,
            iterations: t?,
            parallelism: p?,
        })
    }
}
