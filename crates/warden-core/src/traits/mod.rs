//! Core traits defined in `warden-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
