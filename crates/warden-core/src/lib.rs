//! # warden-core
//!
//! Core crate for Warden. Contains the configuration schemas, the cache
//! backend trait consumed by the session subsystem, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
