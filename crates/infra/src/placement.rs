//! Order placement (application-level orchestration).
//!
//! One placement attempt is one unit-of-work:
//!
//! ```text
//! request
//!   ↓
//! 1. begin unit-of-work
//!   ↓
//! 2. allocate order id (serialized against concurrent allocations)
//!   ↓
//! 3. stage the order row (referential check on the client)
//!   ↓
//! 4. per line, in request order: ledger decrement, then stage the line
//!   ↓
//! 5. commit — or roll back on the first failure
//! ```
//!
//! Committed and aborted are the only terminal outcomes, and every effect
//! of the attempt (order row, lines, decrements) becomes visible together
//! or not at all. Nothing here retries; the error kinds tell the caller
//! whether a retry is worthwhile.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use orderdesk_core::{ArticleId, ClientId, OrderId};
use orderdesk_orders::OrderRequest;

use crate::store::{PlacementUow, ShopStore, StoreError};

/// Failure of one placement attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// The order references a client that does not exist. Not retriable.
    #[error("client {0} does not exist")]
    UnknownClient(ClientId),

    /// A line references an article that does not exist. Not retriable.
    #[error("article {0} does not exist")]
    ArticleNotFound(ArticleId),

    /// A line asked for more than is available. Retriable with a smaller
    /// amount, at the caller's discretion.
    #[error("insufficient stock for article {article_id}: requested {requested}, available {available}")]
    InsufficientStock {
        article_id: ArticleId,
        requested: i64,
        available: i64,
    },

    /// The unit-of-work lost its isolation race. Retriable as-is.
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// The store could not be reached. Retriable as-is.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Unexpected store failure.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl PlacementError {
    /// Whether resubmitting the same request can reasonably succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            PlacementError::ConcurrencyConflict(_) | PlacementError::StoreUnavailable(_)
        )
    }
}

impl From<StoreError> for PlacementError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::UnknownClient(id) => PlacementError::UnknownClient(id),
            StoreError::ArticleNotFound(id) => PlacementError::ArticleNotFound(id),
            StoreError::InsufficientStock {
                article_id,
                requested,
                available,
            } => PlacementError::InsufficientStock {
                article_id,
                requested,
                available,
            },
            StoreError::Conflict(msg) => PlacementError::ConcurrencyConflict(msg),
            StoreError::Unavailable(msg) => PlacementError::StoreUnavailable(msg),
            StoreError::Backend(msg) => PlacementError::Internal(msg),
        }
    }
}

/// Places orders against an injected store handle.
#[derive(Clone)]
pub struct PlacementService {
    store: Arc<dyn ShopStore>,
}

impl PlacementService {
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    /// Place one order: allocate an id, check and decrement stock per line,
    /// persist the order and its lines — atomically.
    ///
    /// Errors are returned as values; this function never panics across the
    /// service boundary. After an error, no effect of the attempt is
    /// observable.
    #[instrument(
        skip_all,
        fields(client_id = %request.client_id(), line_count = request.lines().len())
    )]
    pub async fn place_order(&self, request: &OrderRequest) -> Result<OrderId, PlacementError> {
        let mut uow = self.store.begin_placement().await?;

        match stage_order(uow.as_mut(), request).await {
            Ok(order_id) => {
                uow.commit().await?;
                tracing::info!(order_id = %order_id, "order placed");
                Ok(order_id)
            }
            Err(err) => {
                // Undo every decrement and staged row from this attempt.
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback after failed placement also failed");
                }
                tracing::info!(error = %err, "order placement aborted");
                Err(err)
            }
        }
    }
}

async fn stage_order(
    uow: &mut dyn PlacementUow,
    request: &OrderRequest,
) -> Result<OrderId, PlacementError> {
    let order_id = uow.allocate_order_id().await?;
    uow.insert_order(order_id, request.client_id()).await?;

    for line in request.lines() {
        uow.decrement_stock(line.article_id, line.amount).await?;
        uow.insert_line(order_id, line.article_id, line.amount).await?;
    }

    Ok(order_id)
}
