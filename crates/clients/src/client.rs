use serde::{Deserialize, Serialize};

use orderdesk_core::{ClientId, DomainError};

/// A client the shop can take orders for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: ClientId,
    name: String,
    address: String,
    city: String,
    country: String,
}

impl Client {
    pub fn new(
        id: ClientId,
        name: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            address: address.into(),
            city: city.into(),
            country: country.into(),
        })
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_requires_a_name() {
        let err = Client::new(ClientId::new(1), "", "Main St 1", "Vienna", "AT").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let ok = Client::new(ClientId::new(1), "Acme", "Main St 1", "Vienna", "AT").unwrap();
        assert_eq!(ok.name(), "Acme");
    }
}
