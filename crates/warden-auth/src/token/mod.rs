//! Signed access token issuance.

pub mod claims;
pub mod issuer;

pub use claims::TokenClaims;
pub use issuer::{IssuedToken, TokenIssuer};
