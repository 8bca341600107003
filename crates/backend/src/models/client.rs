//! The `Client` entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clientdesk_core::ClientId;

use super::Address;

/// A client with contact details and zero or more owned addresses.
///
/// `email` and `phone` are globally unique among clients (enforced by the
/// database schema as the backstop, and pre-checked by the use-cases).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Owned addresses, lazily attached. `None` means "not loaded", not
    /// "has no addresses".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Create a new client with a fresh id and creation timestamps.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ClientId::generate(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            addresses: None,
            created_at: now,
            updated_at: now,
        }
    }
}
