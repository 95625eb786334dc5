//! Locating and decoding the RSA private key on disk.

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use secrecy::{ExposeSecret, SecretString};

use warden_core::error::AppError;
use warden_core::result::AppResult;

/// Find the single `.pem` file in `dir`.
///
/// A missing directory, an empty one, or more than one candidate is an
/// error: the service must not guess which key to publish.
pub fn find_credential(dir: &Path) -> AppResult<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        IoErrorKind::NotFound => AppError::credential(format!(
            "Signing key directory {} does not exist",
            dir.display()
        )),
        _ => AppError::credential(format!(
            "Signing key directory {} is not readable: {e}",
            dir.display()
        )),
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_pem(&path) {
            candidates.push(path);
        }
    }

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(AppError::credential(format!(
            "No .pem signing key found in {}",
            dir.display()
        ))),
        n => Err(AppError::credential(format!(
            "Expected exactly one .pem signing key in {}, found {n}",
            dir.display()
        ))),
    }
}

fn is_pem(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pem"))
}

/// Decode a PEM private key.
///
/// With a passphrase the input must be an encrypted PKCS#8 document.
/// Without one it may be plaintext PKCS#8 or PKCS#1. There is no fallback
/// between the two modes.
pub fn decode_private_key(pem: &str, passphrase: Option<&SecretString>) -> AppResult<RsaPrivateKey> {
    match passphrase {
        Some(passphrase) => {
            RsaPrivateKey::from_pkcs8_encrypted_pem(pem, passphrase.expose_secret().as_bytes())
                .map_err(|e| {
                    AppError::credential(format!("Failed to decrypt signing key: {e}"))
                })
        }
        None => RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| AppError::credential(format!("Failed to parse signing key: {e}"))),
    }
}

/// Find and decode the key in `dir`.
pub fn load_private_key(
    dir: &Path,
    passphrase: Option<&SecretString>,
) -> AppResult<(PathBuf, RsaPrivateKey)> {
    let path = find_credential(dir)?;
    let pem = fs::read_to_string(&path).map_err(|e| {
        AppError::credential(format!("Failed to read signing key {}: {e}", path.display()))
    })?;
    let key = decode_private_key(&pem, passphrase)?;
    Ok((path, key))
}
