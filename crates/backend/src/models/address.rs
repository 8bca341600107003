//! The `Address` entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clientdesk_core::{AddressId, ClientId};

/// A postal address owned by exactly one client.
///
/// `zip_code` is globally unique among addresses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub client_id: ClientId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller-supplied fields of an address, before identity and
/// ownership are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default)]
    pub complement: Option<String>,
}

impl Address {
    /// Create a new address owned by `client_id`, with a fresh id and
    /// creation timestamps.
    #[must_use]
    pub fn new(fields: NewAddress, client_id: ClientId) -> Self {
        let now = Utc::now();
        Self {
            id: AddressId::generate(),
            street: fields.street,
            city: fields.city,
            state: fields.state,
            zip_code: fields.zip_code,
            country: fields.country,
            complement: fields.complement,
            client_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> NewAddress {
        NewAddress {
            street: "1 Main St".into(),
            city: "Lisbon".into(),
            state: "LX".into(),
            zip_code: "1000-001".into(),
            country: "PT".into(),
            complement: None,
        }
    }

    #[test]
    fn test_new_assigns_owner() {
        let client_id = ClientId::generate();
        let address = Address::new(fields(), client_id);
        assert_eq!(address.client_id, client_id);
        assert_eq!(address.created_at, address.updated_at);
        assert!(address.complement.is_none());
    }
}
