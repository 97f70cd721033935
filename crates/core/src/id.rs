//! Strongly-typed identifiers used across the domain.
//!
//! Articles, clients and orders are keyed by plain integers in the store;
//! the newtypes exist so the compiler keeps them apart.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an article in the catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(i64);

/// Identifier of a client.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(i64);

/// Identifier of an order.
///
/// Orders are numbered monotonically: each committed order's id is one
/// greater than the highest id that existed when it was placed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

macro_rules! impl_i64_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = i64::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(raw))
            }
        }
    };
}

impl_i64_newtype!(ArticleId, "ArticleId");
impl_i64_newtype!(ClientId, "ClientId");
impl_i64_newtype!(OrderId, "OrderId");

impl OrderId {
    /// The successor id, used when allocating the next order number.
    pub const fn next(&self) -> OrderId {
        OrderId(self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_next_is_plus_one() {
        assert_eq!(OrderId::new(0).next(), OrderId::new(1));
        assert_eq!(OrderId::new(41).next(), OrderId::new(42));
    }

    #[test]
    fn ids_parse_from_strings() {
        let id: ArticleId = "100".parse().unwrap();
        assert_eq!(id, ArticleId::new(100));

        let err = "not-a-number".parse::<ClientId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }
}
