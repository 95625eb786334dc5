//! The keyed secret mixed into every password digest.

use std::fmt;

use once_cell::sync::OnceCell;
use secrecy::{ExposeSecret, SecretSlice};

use warden_core::error::AppError;
use warden_core::result::AppResult;

type SecretLoader = Box<dyn Fn() -> AppResult<Vec<u8>> + Send + Sync>;

/// Process-wide hashing secret, loaded on first use and immutable after.
///
/// Concurrent first accesses run the loader exactly once; the others block
/// until it finishes and then observe the same bytes. A failed load is not
/// cached, so the next access retries.
pub struct HashSecret {
    /// Where the secret comes from, for logs and errors.
    source: String,
    loader: SecretLoader,
    value: OnceCell<SecretSlice<u8>>,
}

impl HashSecret {
    /// Read the secret from environment variable `var` on first use.
    pub fn from_env(var: impl Into<String>) -> Self {
        let var = var.into();
        let name = var.clone();
        Self::from_loader(format!("env:{var}"), move || {
            let value = std::env::var(&name).map_err(|_| {
                AppError::credential(format!("Environment variable {name} is not set"))
            })?;
            Ok(value.into_bytes())
        })
    }

    /// Use a custom loader, invoked at most once successfully.
    pub fn from_loader<F>(source: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> AppResult<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            loader: Box::new(loader),
            value: OnceCell::new(),
        }
    }

    /// Wrap bytes that are already in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let secret = Self::from_loader("inline", || {
            Err(AppError::internal("inline secret has no loader"))
        });
        // A fresh cell cannot already be set.
        let _ = secret.value.set(SecretSlice::from(bytes));
        secret
    }

    /// The secret bytes, loading them on first call.
    pub fn expose(&self) -> AppResult<&[u8]> {
        let secret = self.value.get_or_try_init(|| {
            let bytes = (self.loader)()?;
            if bytes.is_empty() {
                return Err(AppError::credential(format!(
                    "Password hashing secret from {} is empty",
                    self.source
                )));
            }
            tracing::info!(source = %self.source, "Password hashing secret loaded");
            Ok(SecretSlice::from(bytes))
        })?;
        Ok(secret.expose_secret())
    }

    /// Whether the secret has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.value.get().is_some()
    }
}

impl fmt::Debug for HashSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashSecret")
            .field("source", &self.source)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
