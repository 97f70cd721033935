//! Postgres-backed shop store.
//!
//! Uses one SQL transaction per placement attempt. Serialization discipline:
//!
//! - order-id allocation takes a transaction-scoped advisory lock on a
//!   dedicated key, so two concurrent placements can never read the same
//!   `MAX(id)`;
//! - the stock check-and-decrement is a single guarded `UPDATE ... WHERE
//!   amount >= $n`, which takes the row lock and holds it to commit, so two
//!   concurrent placements can never jointly oversell an article;
//! - every transaction runs with a bounded `lock_timeout`, so a placement
//!   waits a limited time for its locks and then fails with a retriable
//!   conflict instead of hanging.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | PostgreSQL error code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `23503` (fk violation) | `UnknownClient` | order insert references a missing client |
//! | `23505` (unique violation) | `Conflict` | duplicate order id (only possible if the advisory lock is bypassed) |
//! | `55P03`, `40001`, `40P01` | `Conflict` | lock timeout, serialization failure, deadlock victim |
//! | pool closed/timeout, IO | `Unavailable` | store cannot be reached |
//! | anything else | `Backend` | other database errors |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use orderdesk_clients::Client;
use orderdesk_core::{ArticleId, ClientId, OrderId};
use orderdesk_inventory::Article;

use super::r#trait::{OrderSummary, PlacementUow, ShopStore, StoreError};
use crate::config::StoreConfig;

/// Advisory lock key guarding order-id allocation. Any value works as long
/// as every writer agrees on it and nothing else locks the same key.
const ORDER_ALLOC_LOCK_KEY: i64 = 0x4F52_4445;

/// Postgres-backed store.
///
/// Thread safety: the SQLx pool is `Send + Sync`; clones share it.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    lock_timeout_ms: u64,
}

impl PostgresStore {
    /// Wrap an existing pool (tests, custom wiring).
    pub fn new(pool: PgPool) -> Self {
        Self { pool, lock_timeout_ms: 5_000 }
    }

    /// Build the process-wide pool from config and connect.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| StoreError::Unavailable(format!("failed to connect: {e}")))?;

        Ok(Self {
            pool,
            lock_timeout_ms: config.lock_timeout.as_millis() as u64,
        })
    }

    /// Apply pending schema migrations.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ShopStore for PostgresStore {
    #[instrument(skip(self), err)]
    async fn begin_placement(&self) -> Result<Box<dyn PlacementUow>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        // SET does not take bind parameters; the value comes from config,
        // never from a request.
        let bound_wait = format!("SET LOCAL lock_timeout = '{}ms'", self.lock_timeout_ms);
        sqlx::query(&bound_wait)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_lock_timeout", e))?;

        Ok(Box::new(PgPlacementUow { tx }))
    }

    #[instrument(skip(self), err)]
    async fn article_quantity(&self, article_id: ArticleId) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT amount FROM articles WHERE id = $1")
            .bind(article_id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("article_quantity", e))?;

        match row {
            Some(row) => row
                .try_get("amount")
                .map_err(|e| StoreError::Backend(format!("failed to read amount: {e}"))),
            None => Err(StoreError::ArticleNotFound(article_id)),
        }
    }

    async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, price, amount
            FROM articles
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_articles", e))?;

        rows.iter()
            .map(|row| {
                let row = ArticleRow::from_row(row)
                    .map_err(|e| StoreError::Backend(format!("failed to read article row: {e}")))?;
                row.try_into()
            })
            .collect()
    }

    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, address, city, country
            FROM clients
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_clients", e))?;

        rows.iter()
            .map(|row| {
                let row = ClientRow::from_row(row)
                    .map_err(|e| StoreError::Backend(format!("failed to read client row: {e}")))?;
                row.try_into()
            })
            .collect()
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, StoreError> {
        // LEFT JOIN keeps zero-line orders visible with a count and total
        // of zero.
        let rows = sqlx::query(
            r#"
            SELECT
                orders.id,
                clients.name AS client,
                COUNT(order_lines.id) AS line_count,
                COALESCE(SUM(order_lines.amount * articles.price), 0)::BIGINT AS total_price,
                orders.created_at
            FROM orders
            JOIN clients ON orders.client_id = clients.id
            LEFT JOIN order_lines ON order_lines.order_id = orders.id
            LEFT JOIN articles ON articles.id = order_lines.article_id
            GROUP BY orders.id, clients.name, orders.created_at
            ORDER BY orders.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        rows.iter()
            .map(|row| {
                let row = OrderSummaryRow::from_row(row)
                    .map_err(|e| StoreError::Backend(format!("failed to read order row: {e}")))?;
                Ok(row.into())
            })
            .collect()
    }
}

/// One placement attempt's transaction.
struct PgPlacementUow {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PlacementUow for PgPlacementUow {
    async fn allocate_order_id(&mut self) -> Result<OrderId, StoreError> {
        // Serialize allocation across placements. The lock is released at
        // commit/rollback, which is exactly the window during which the new
        // max id must not be observable by a peer.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ORDER_ALLOC_LOCK_KEY)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("order_alloc_lock", e))?;

        let row = sqlx::query("SELECT COALESCE(MAX(id), 0) AS max_id FROM orders")
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("max_order_id", e))?;

        let max_id: i64 = row
            .try_get("max_id")
            .map_err(|e| StoreError::Backend(format!("failed to read max_id: {e}")))?;

        Ok(OrderId::new(max_id).next())
    }

    async fn insert_order(
        &mut self,
        order_id: OrderId,
        client_id: ClientId,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO orders (id, client_id) VALUES ($1, $2)")
            .bind(order_id.as_i64())
            .bind(client_id.as_i64())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::UnknownClient(client_id)
                } else {
                    map_sqlx_error("insert_order", e)
                }
            })?;

        Ok(())
    }

    async fn current_quantity(&mut self, article_id: ArticleId) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT amount FROM articles WHERE id = $1")
            .bind(article_id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("current_quantity", e))?;

        match row {
            Some(row) => row
                .try_get("amount")
                .map_err(|e| StoreError::Backend(format!("failed to read amount: {e}"))),
            None => Err(StoreError::ArticleNotFound(article_id)),
        }
    }

    async fn decrement_stock(
        &mut self,
        article_id: ArticleId,
        amount: i64,
    ) -> Result<(), StoreError> {
        // Check-and-decrement in one statement: the UPDATE takes the row
        // lock and re-evaluates the guard against the committed row, so the
        // quantity can never be driven below zero by concurrent placements.
        let updated = sqlx::query(
            r#"
            UPDATE articles
            SET amount = amount - $2
            WHERE id = $1 AND amount >= $2
            RETURNING amount
            "#,
        )
        .bind(article_id.as_i64())
        .bind(amount)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("decrement_stock", e))?;

        if updated.is_some() {
            return Ok(());
        }

        // The guard failed: missing article or short stock. Read back to
        // tell the two apart; this read is diagnostic only, the decrement
        // itself already refused atomically.
        match self.current_quantity(article_id).await {
            Ok(available) => Err(StoreError::InsufficientStock {
                article_id,
                requested: amount,
                available,
            }),
            Err(err) => Err(err),
        }
    }

    async fn insert_line(
        &mut self,
        order_id: OrderId,
        article_id: ArticleId,
        amount: i64,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO order_lines (order_id, article_id, amount) VALUES ($1, $2, $3)")
            .bind(order_id.as_i64())
            .bind(article_id.as_i64())
            .bind(amount)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_line", e))?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                // Lock timeout, serialization failure, deadlock victim: the
                // unit-of-work lost its isolation race and the caller may
                // retry.
                Some("55P03") | Some("40001") | Some("40P01") => StoreError::Conflict(msg),
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23503";
        }
    }
    false
}

// SQLx row types

#[derive(Debug)]
struct ArticleRow {
    id: i64,
    description: String,
    price: i64,
    amount: i64,
}

impl<'r> FromRow<'r, PgRow> for ArticleRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ArticleRow {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            amount: row.try_get("amount")?,
        })
    }
}

impl TryFrom<ArticleRow> for Article {
    type Error = StoreError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        Article::new(ArticleId::new(row.id), row.description, row.price, row.amount)
            .map_err(|e| StoreError::Backend(format!("invalid article row {}: {e}", row.id)))
    }
}

#[derive(Debug)]
struct ClientRow {
    id: i64,
    name: String,
    address: String,
    city: String,
    country: String,
}

impl<'r> FromRow<'r, PgRow> for ClientRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ClientRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            country: row.try_get("country")?,
        })
    }
}

impl TryFrom<ClientRow> for Client {
    type Error = StoreError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        Client::new(ClientId::new(row.id), row.name, row.address, row.city, row.country)
            .map_err(|e| StoreError::Backend(format!("invalid client row {}: {e}", row.id)))
    }
}

#[derive(Debug)]
struct OrderSummaryRow {
    id: i64,
    client: String,
    line_count: i64,
    total_price: i64,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for OrderSummaryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderSummaryRow {
            id: row.try_get("id")?,
            client: row.try_get("client")?,
            line_count: row.try_get("line_count")?,
            total_price: row.try_get("total_price")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        OrderSummary {
            id: OrderId::new(row.id),
            client: row.client,
            line_count: row.line_count,
            total_price: row.total_price,
            created_at: row.created_at,
        }
    }
}
