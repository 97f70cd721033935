use serde::{Deserialize, Serialize};

use orderdesk_core::{ArticleId, DomainError};

/// An article in the catalog together with its available stock.
///
/// `price` is in the smallest currency unit (e.g. cents). `quantity` is the
/// number of units currently available; it never goes negative — the only
/// mutation path is [`Article::decrement`], which refuses to cross zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    id: ArticleId,
    description: String,
    price: i64,
    quantity: i64,
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// The decrement was applied; `remaining` is the quantity left.
    Applied { remaining: i64 },
    /// Not enough stock; nothing was changed.
    Insufficient { available: i64 },
}

impl Article {
    pub fn new(
        id: ArticleId,
        description: impl Into<String>,
        price: i64,
        quantity: i64,
    ) -> Result<Self, DomainError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        if price < 0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        Ok(Self { id, description, price, quantity })
    }

    pub fn id(&self) -> ArticleId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Check-and-decrement as one step.
    ///
    /// Succeeds only when `amount <= quantity`, so the quantity can never
    /// become negative. An `amount` of zero is a no-op that still reports
    /// `Applied`.
    pub fn decrement(&mut self, amount: i64) -> Decrement {
        debug_assert!(amount >= 0, "callers validate amounts before the ledger");
        if amount > self.quantity {
            return Decrement::Insufficient { available: self.quantity };
        }
        self.quantity -= amount;
        Decrement::Applied { remaining: self.quantity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn article(quantity: i64) -> Article {
        Article::new(ArticleId::new(100), "Widget", 250, quantity).unwrap()
    }

    #[test]
    fn new_rejects_negative_price_and_quantity() {
        assert!(Article::new(ArticleId::new(1), "x", -1, 0).is_err());
        assert!(Article::new(ArticleId::new(1), "x", 0, -1).is_err());
        assert!(Article::new(ArticleId::new(1), "  ", 0, 0).is_err());
    }

    #[test]
    fn decrement_within_stock_is_applied() {
        let mut a = article(5);
        assert_eq!(a.decrement(3), Decrement::Applied { remaining: 2 });
        assert_eq!(a.quantity(), 2);
    }

    #[test]
    fn decrement_beyond_stock_leaves_article_unchanged() {
        let mut a = article(2);
        assert_eq!(a.decrement(3), Decrement::Insufficient { available: 2 });
        assert_eq!(a.quantity(), 2);
    }

    #[test]
    fn decrement_of_zero_is_a_noop() {
        let mut a = article(2);
        assert_eq!(a.decrement(0), Decrement::Applied { remaining: 2 });
        assert_eq!(a.quantity(), 2);
    }

    #[test]
    fn decrement_to_exactly_zero_succeeds() {
        let mut a = article(2);
        assert_eq!(a.decrement(2), Decrement::Applied { remaining: 0 });
        assert_eq!(a.quantity(), 0);
    }

    proptest! {
        #[test]
        fn quantity_never_goes_negative(start in 0i64..10_000, amount in 0i64..20_000) {
            let mut a = article(start);
            let _ = a.decrement(amount);
            prop_assert!(a.quantity() >= 0);
        }

        #[test]
        fn applied_decrements_are_exact(start in 0i64..10_000, amount in 0i64..10_000) {
            let mut a = article(start);
            match a.decrement(amount) {
                Decrement::Applied { remaining } => {
                    prop_assert_eq!(remaining, start - amount);
                    prop_assert_eq!(a.quantity(), start - amount);
                }
                Decrement::Insufficient { available } => {
                    prop_assert!(amount > start);
                    prop_assert_eq!(available, start);
                    prop_assert_eq!(a.quantity(), start);
                }
            }
        }
    }
}
