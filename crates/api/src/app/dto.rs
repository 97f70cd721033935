use serde::Deserialize;

use orderdesk_clients::Client;
use orderdesk_core::{ArticleId, ClientId, DomainError};
use orderdesk_infra::store::OrderSummary;
use orderdesk_inventory::Article;
use orderdesk_orders::{OrderLine, OrderRequest};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub client_id: i64,
    pub lines: Vec<PlaceOrderLine>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderLine {
    pub article_id: i64,
    pub amount: i64,
}

impl PlaceOrderRequest {
    /// Validate into the domain request (rejects negative amounts).
    pub fn into_domain(self) -> Result<OrderRequest, DomainError> {
        let lines = self
            .lines
            .into_iter()
            .map(|l| OrderLine {
                article_id: ArticleId::new(l.article_id),
                amount: l.amount,
            })
            .collect();
        OrderRequest::new(ClientId::new(self.client_id), lines)
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn article_to_json(article: &Article) -> serde_json::Value {
    serde_json::json!({
        "id": article.id().as_i64(),
        "description": article.description(),
        "price": article.price(),
        "amount": article.quantity(),
    })
}

pub fn client_to_json(client: &Client) -> serde_json::Value {
    serde_json::json!({
        "id": client.id().as_i64(),
        "name": client.name(),
        "address": client.address(),
        "city": client.city(),
        "country": client.country(),
    })
}

pub fn order_summary_to_json(summary: &OrderSummary) -> serde_json::Value {
    serde_json::json!({
        "id": summary.id.as_i64(),
        "client": summary.client,
        "lines": summary.line_count,
        "price": summary.total_price,
        "created_at": summary.created_at.to_rfc3339(),
    })
}
