//! Byte encoding of session tickets stored in the cache.
//!
//! Layout: one format-version byte followed by the JSON ticket. Entries
//! outlive the process that wrote them, so a new layout needs a new version
//! byte and a decoder for every version still in the cache.

use warden_core::error::AppError;
use warden_core::result::AppResult;

use super::ticket::SessionTicket;

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

/// Serializes and deserializes [`SessionTicket`] payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionTicketCodec;

impl SessionTicketCodec {
    /// Encode a ticket.
    pub fn encode(&self, ticket: &SessionTicket) -> AppResult<Vec<u8>> {
        let mut bytes = vec![FORMAT_VERSION];
        serde_json::to_writer(&mut bytes, ticket)?;
        Ok(bytes)
    }

    /// Decode a ticket written by [`encode`](Self::encode).
    pub fn decode(&self, bytes: &[u8]) -> AppResult<SessionTicket> {
        match bytes.split_first() {
            Some((&FORMAT_VERSION, body)) => Ok(serde_json::from_slice(body)?),
            Some((version, _)) => Err(AppError::serialization(format!(
                "Unsupported session ticket format version {version}"
            ))),
            None => Err(AppError::serialization("Empty session ticket payload")),
        }
    }
}
