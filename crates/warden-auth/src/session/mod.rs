//! Session tickets: cache-backed storage and per-owner revocation.

pub mod codec;
pub mod index;
pub mod key;
pub mod store;
pub mod ticket;

pub use codec::SessionTicketCodec;
pub use index::{RevocationReport, SessionIndex};
pub use key::SessionKey;
pub use store::SessionTicketStore;
pub use ticket::{Principal, PrincipalClaim, SessionTicket, TicketProperties};
