//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Secrets never live in these files; sections only name the
//! environment variables that hold them.

pub mod cache;
pub mod logging;
pub mod password;
pub mod session;
pub mod signing;

use serde::{Deserialize, Serialize};

pub use self::cache::CacheConfig;
pub use self::logging::LoggingConfig;
pub use self::password::PasswordConfig;
pub use self::session::SessionConfig;
pub use self::signing::SigningConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "WARDEN";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Password hashing settings.
    #[serde(default)]
    pub password: PasswordConfig,
    /// JWT signing key settings.
    #[serde(default)]
    pub signing: SigningConfig,
    /// Session ticket settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with the `config/{env}.toml` overlay and
    /// environment variables such as `WARDEN__CACHE__PROVIDER=redis`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        let parsed: Self = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject values that would silently weaken the session or hashing model.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.session.nonce_bytes < session::MIN_NONCE_BYTES {
            return Err(AppError::configuration(format!(
                "session.nonce_bytes must be at least {} (got {})",
                session::MIN_NONCE_BYTES,
                self.session.nonce_bytes
            )));
        }
        if self.session.key_prefix.is_empty() || self.session.key_prefix.contains('_') {
            return Err(AppError::configuration(
                "session.key_prefix must be non-empty and must not contain '_'",
            ));
        }
        if !(1..=signing::MAX_TOKEN_TTL_MINUTES).contains(&self.signing.token_ttl_minutes) {
            return Err(AppError::configuration(format!(
                "signing.token_ttl_minutes must be between 1 and {} (got {})",
                signing::MAX_TOKEN_TTL_MINUTES,
                self.signing.token_ttl_minutes
            )));
        }
        if self.password.max_concurrent_hashes == 0 {
            return Err(AppError::configuration(
                "password.max_concurrent_hashes must be greater than zero",
            ));
        }
        if self.cache.operation_timeout_ms == 0 {
            return Err(AppError::configuration(
                "cache.operation_timeout_ms must be greater than zero",
            ));
        }
        Ok(())
    }
}
