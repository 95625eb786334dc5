//! Keyed Argon2id password hashing with a self-describing encoding.

pub mod codec;
pub mod hasher;
pub mod params;
pub mod secret;

pub use codec::EncodedHash;
pub use hasher::{PasswordHasher, PasswordVerification};
pub use params::HashParams;
pub use secret::HashSecret;
