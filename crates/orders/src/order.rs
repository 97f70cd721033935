use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::{ArticleId, ClientId, DomainError, OrderId};

/// One line of an order: an article and the amount ordered.
///
/// Amounts are validated to be non-negative before a request enters the
/// core; zero is allowed and produces a line that decrements nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub article_id: ArticleId,
    pub amount: i64,
}

/// A validated request to place an order.
///
/// The line sequence keeps the caller's order, including duplicates of the
/// same article — the ledger applies those as independent decrements against
/// the running balance. An empty line list is accepted and yields an order
/// with zero lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    client_id: ClientId,
    lines: Vec<OrderLine>,
}

impl OrderRequest {
    pub fn new(client_id: ClientId, lines: Vec<OrderLine>) -> Result<Self, DomainError> {
        for (idx, line) in lines.iter().enumerate() {
            if line.amount < 0 {
                return Err(DomainError::validation(format!(
                    "line {}: amount cannot be negative",
                    idx + 1
                )));
            }
        }
        Ok(Self { client_id, lines })
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }
}

/// A committed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    client_id: ClientId,
    created_at: DateTime<Utc>,
    lines: Vec<OrderLine>,
}

impl Order {
    pub fn new(
        id: OrderId,
        client_id: ClientId,
        created_at: DateTime<Utc>,
        lines: Vec<OrderLine>,
    ) -> Self {
        Self { id, client_id, created_at, lines }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line(article_id: i64, amount: i64) -> OrderLine {
        OrderLine { article_id: ArticleId::new(article_id), amount }
    }

    #[test]
    fn request_rejects_negative_amounts() {
        let err = OrderRequest::new(ClientId::new(1), vec![line(100, -1)]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn request_accepts_empty_line_list() {
        let req = OrderRequest::new(ClientId::new(1), vec![]).unwrap();
        assert!(req.lines().is_empty());
    }

    #[test]
    fn request_accepts_zero_amounts() {
        let req = OrderRequest::new(ClientId::new(1), vec![line(100, 0)]).unwrap();
        assert_eq!(req.lines()[0].amount, 0);
    }

    #[test]
    fn request_preserves_line_order_and_duplicates() {
        let req = OrderRequest::new(
            ClientId::new(1),
            vec![line(100, 3), line(200, 2), line(100, 1)],
        )
        .unwrap();
        let articles: Vec<i64> = req.lines().iter().map(|l| l.article_id.as_i64()).collect();
        assert_eq!(articles, vec![100, 200, 100]);
    }

    proptest! {
        #[test]
        fn request_validation_matches_sign_of_amounts(amounts in proptest::collection::vec(-5i64..50, 0..8)) {
            let lines: Vec<OrderLine> =
                amounts.iter().enumerate().map(|(i, &a)| line(i as i64, a)).collect();
            let result = OrderRequest::new(ClientId::new(7), lines.clone());
            if amounts.iter().any(|&a| a < 0) {
                prop_assert!(result.is_err());
            } else {
                let req = result.unwrap();
                prop_assert_eq!(req.lines(), lines.as_slice());
            }
        }
    }
}
