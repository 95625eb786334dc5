//! The server-side record of an authenticated session.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One claim asserted about the principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalClaim {
    /// Claim type, e.g. `role`.
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value.
    pub value: String,
}

/// The identity a ticket was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable id of the owning identity. Every session key embeds it.
    pub owner_id: Uuid,
    /// Display name at login time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Claims captured at login time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<PrincipalClaim>,
}

impl Principal {
    /// A principal with no name or claims.
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            name: None,
            claims: Vec::new(),
        }
    }

    /// Add a claim.
    pub fn with_claim(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.push(PrincipalClaim {
            claim_type: claim_type.into(),
            value: value.into(),
        });
        self
    }

    /// Values of every claim of `claim_type`.
    pub fn claim_values<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.claims
            .iter()
            .filter(move |c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }
}

/// Session metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketProperties {
    /// Free-form string properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub items: BTreeMap<String, String>,
    /// When the session was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    /// Absolute expiry. Also the cache entry's expiry; unset means the
    /// cache default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the client keeps the session across browser restarts.
    #[serde(default)]
    pub is_persistent: bool,
    /// Whether the session may be renewed.
    #[serde(default)]
    pub allow_refresh: bool,
}

/// A session ticket: principal plus properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTicket {
    /// Authentication scheme that produced the ticket.
    pub scheme: String,
    /// The authenticated identity.
    pub principal: Principal,
    /// Session metadata.
    #[serde(default)]
    pub properties: TicketProperties,
}

impl SessionTicket {
    /// A ticket issued now, with no expiry.
    pub fn new(scheme: impl Into<String>, principal: Principal) -> Self {
        Self {
            scheme: scheme.into(),
            principal,
            properties: TicketProperties {
                issued_at: Some(Utc::now()),
                ..TicketProperties::default()
            },
        }
    }

    /// Set the absolute expiry.
    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.properties.expires_at = Some(expires_at);
        self
    }

    /// Id of the owning identity.
    pub fn owner_id(&self) -> Uuid {
        self.principal.owner_id
    }

    /// Whether the absolute expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.properties
            .expires_at
            .is_some_and(|expires_at| expires_at <= Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_claim_values() {
        let principal = Principal::new(Uuid::new_v4())
            .with_claim("role", "admin")
            .with_claim("email", "a@example.com")
            .with_claim("role", "auditor");
        let roles: Vec<_> = principal.claim_values("role").collect();
        assert_eq!(roles, vec!["admin", "auditor"]);
    }

    #[test]
    fn test_expiry() {
        let owner = Uuid::new_v4();
        let live = SessionTicket::new("Cookies", Principal::new(owner))
            .expires_at(Utc::now() + Duration::hours(1));
        let dead = SessionTicket::new("Cookies", Principal::new(owner))
            .expires_at(Utc::now() - Duration::seconds(1));
        let open = SessionTicket::new("Cookies", Principal::new(owner));
        assert!(!live.is_expired());
        assert!(dead.is_expired());
        assert!(!open.is_expired());
        assert_eq!(open.owner_id(), owner);
    }
}
