//! # warden-auth
//!
//! The authentication core of the Warden identity service.
//!
//! ## Modules
//!
//! - `password`: keyed Argon2id hashing with a self-describing encoding
//! - `signing`: RSA signing key loading and JWK publication
//! - `token`: RS256 access token issuance
//! - `session`: cache-backed session tickets and per-owner revocation
//! - `context`: the [`AuthContext`] that wires them together

pub mod context;
pub mod password;
pub mod session;
pub mod signing;
pub mod token;

pub use context::AuthContext;
pub use password::{PasswordHasher, PasswordVerification};
pub use session::{RevocationReport, SessionIndex, SessionKey, SessionTicket, SessionTicketStore};
pub use signing::{Jwk, Jwks, SigningCredential, SigningKeyRepository};
pub use token::{TokenClaims, TokenIssuer};
