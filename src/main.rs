//! Warden Server: authentication core of the identity service.
//!
//! Loads configuration, connects the cache, and builds the authentication
//! context. Missing credentials or an unreachable cache stop the process
//! before it reports ready.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use warden_auth::AuthContext;
use warden_cache::CacheManager;
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_core::traits::cache::CacheProvider;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Startup failed");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("WARDEN_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Cache ────────────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);
    if !cache.health_check().await? {
        return Err(AppError::cache("Cache health check failed"));
    }

    // ── Step 2: Authentication context ───────────────────────────
    tracing::info!("Initializing authentication context");
    let auth = AuthContext::initialize(&config, Arc::clone(&cache)).await?;
    tracing::info!(
        session_prefix = %config.session.key_prefix,
        issuer = %config.signing.issuer,
        "Warden ready"
    );

    // ── Step 3: Wait for shutdown ────────────────────────────────
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Failed to listen for shutdown signal: {e}")))?;
    tracing::info!("Shutdown signal received");

    auth.shutdown().await?;
    tracing::info!("Warden stopped");
    Ok(())
}
