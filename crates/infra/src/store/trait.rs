//! Store traits and the store-level error model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use orderdesk_clients::Client;
use orderdesk_core::{ArticleId, ClientId, OrderId};
use orderdesk_inventory::Article;

/// Store-level error.
///
/// The first three variants are deterministic business outcomes surfaced by
/// the store (the referential-integrity and stock checks live there); the
/// rest are operational. `Conflict` and `Unavailable` are retriable from the
/// caller's point of view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced client does not exist (referential-integrity check).
    #[error("client {0} does not exist")]
    UnknownClient(ClientId),

    /// The referenced article does not exist.
    #[error("article {0} does not exist")]
    ArticleNotFound(ArticleId),

    /// The requested amount exceeds the available quantity.
    #[error("insufficient stock for article {article_id}: requested {requested}, available {available}")]
    InsufficientStock {
        article_id: ArticleId,
        requested: i64,
        available: i64,
    },

    /// The unit-of-work could not obtain its isolation guarantee in time
    /// (lock timeout, deadlock victim, serialization failure).
    #[error("concurrency conflict: {0}")]
    Conflict(String),

    /// The backing store could not be reached (pool exhausted/closed, IO).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// One row of the order listing: an order joined with its client's name,
/// line count and total price (sum of `line amount * article price`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub client: String,
    pub line_count: i64,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

/// The shop's persistence boundary.
///
/// Reads outside a unit-of-work see committed state only. All mutations go
/// through [`ShopStore::begin_placement`].
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Open a unit-of-work for one placement attempt.
    ///
    /// The returned unit-of-work isolates its effects from concurrent peers
    /// until [`PlacementUow::commit`]; dropping it without committing
    /// discards every staged effect.
    async fn begin_placement(&self) -> Result<Box<dyn PlacementUow>, StoreError>;

    /// Committed available quantity of one article.
    async fn article_quantity(&self, article_id: ArticleId) -> Result<i64, StoreError>;

    async fn list_articles(&self) -> Result<Vec<Article>, StoreError>;

    async fn list_clients(&self) -> Result<Vec<Client>, StoreError>;

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, StoreError>;
}

/// Unit-of-work for one placement attempt.
///
/// All operations observe the attempt's own uncommitted effects (a second
/// decrement of the same article sees the balance left by the first), and
/// none of them are visible to concurrent units-of-work before `commit`.
/// `commit` and `rollback` are terminal; dropping the value without calling
/// either is equivalent to `rollback`, which is what makes an abandoned
/// request resolve cleanly.
#[async_trait]
pub trait PlacementUow: Send {
    /// Allocate the next order identifier: one greater than the maximum
    /// existing order id, 0-based. Serialized against concurrent
    /// allocations for the lifetime of the unit-of-work.
    async fn allocate_order_id(&mut self) -> Result<OrderId, StoreError>;

    /// Stage the order row. Fails with [`StoreError::UnknownClient`] when
    /// the client id references nothing.
    async fn insert_order(
        &mut self,
        order_id: OrderId,
        client_id: ClientId,
    ) -> Result<(), StoreError>;

    /// Quantity of one article as seen by this unit-of-work.
    async fn current_quantity(&mut self, article_id: ArticleId) -> Result<i64, StoreError>;

    /// Atomically check `quantity >= amount` and decrement. On
    /// [`StoreError::InsufficientStock`] or [`StoreError::ArticleNotFound`]
    /// the ledger is left unchanged for that article.
    async fn decrement_stock(
        &mut self,
        article_id: ArticleId,
        amount: i64,
    ) -> Result<(), StoreError>;

    /// Stage one order line.
    async fn insert_line(
        &mut self,
        order_id: OrderId,
        article_id: ArticleId,
        amount: i64,
    ) -> Result<(), StoreError>;

    /// Make every staged effect visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard every staged effect.
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
