//! RSA signing key management and JWK publication.

pub mod jwk;
pub mod loader;
pub mod repository;

pub use jwk::{Jwk, Jwks};
pub use repository::{RsaKeyMaterial, SIGNING_ALGORITHM, SigningCredential, SigningKeyRepository};
