//! In-memory shop store (dev/test).
//!
//! Mirrors the Postgres store's isolation discipline in the coarsest way
//! that is still correct: a unit-of-work owns the store's async mutex for
//! its whole lifetime, stages its changes against a private copy, and
//! publishes them atomically at commit. Placements are therefore fully
//! serialized, which trivially satisfies the no-oversell and unique-id
//! guarantees; concurrent callers queue on the mutex instead of on row
//! locks.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use orderdesk_clients::Client;
use orderdesk_core::{ArticleId, ClientId, OrderId};
use orderdesk_inventory::{Article, Decrement};
use orderdesk_orders::{Order, OrderLine};

use super::r#trait::{OrderSummary, PlacementUow, ShopStore, StoreError};

#[derive(Debug, Default, Clone)]
struct ShopState {
    articles: BTreeMap<ArticleId, Article>,
    clients: BTreeMap<ClientId, Client>,
    orders: BTreeMap<OrderId, Order>,
}

/// In-memory store. Cheap to clone; clones share state.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<ShopState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with a small demo catalog, used when the process
    /// runs without a `DATABASE_URL`.
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        {
            let mut state = store
                .state
                .try_lock()
                .expect("fresh store has no other lock holders");
            for article in demo_articles() {
                state.articles.insert(article.id(), article);
            }
            for client in demo_clients() {
                state.clients.insert(client.id(), client);
            }
        }
        store
    }

    pub async fn seed_article(&self, article: Article) {
        self.state.lock().await.articles.insert(article.id(), article);
    }

    pub async fn seed_client(&self, client: Client) {
        self.state.lock().await.clients.insert(client.id(), client);
    }

    /// Number of committed orders (test helper).
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    /// Line set of a committed order (test helper).
    pub async fn order_lines(&self, order_id: OrderId) -> Option<Vec<OrderLine>> {
        self.state
            .lock()
            .await
            .orders
            .get(&order_id)
            .map(|o| o.lines().to_vec())
    }
}

fn demo_articles() -> Vec<Article> {
    [
        (100, "Sunflower seeds, 1kg", 250, 5),
        (200, "Terracotta pot, 20cm", 1_000, 2),
        (300, "Garden trowel", 799, 25),
        (400, "Watering can, 5l", 1_450, 12),
    ]
    .into_iter()
    .map(|(id, description, price, amount)| {
        Article::new(ArticleId::new(id), description, price, amount)
            .expect("demo article data is valid")
    })
    .collect()
}

fn demo_clients() -> Vec<Client> {
    [
        (1, "Acme Corp", "Main Street 1", "Vienna", "AT"),
        (2, "Globex GmbH", "Hafenstrasse 12", "Hamburg", "DE"),
    ]
    .into_iter()
    .map(|(id, name, address, city, country)| {
        Client::new(ClientId::new(id), name, address, city, country)
            .expect("demo client data is valid")
    })
    .collect()
}

#[async_trait]
impl ShopStore for InMemoryStore {
    async fn begin_placement(&self) -> Result<Box<dyn PlacementUow>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let articles = guard.articles.clone();
        Ok(Box::new(MemoryPlacementUow {
            guard,
            articles,
            pending: None,
        }))
    }

    async fn article_quantity(&self, article_id: ArticleId) -> Result<i64, StoreError> {
        self.state
            .lock()
            .await
            .articles
            .get(&article_id)
            .map(Article::quantity)
            .ok_or(StoreError::ArticleNotFound(article_id))
    }

    async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        Ok(self.state.lock().await.articles.values().cloned().collect())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        Ok(self.state.lock().await.clients.values().cloned().collect())
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .values()
            .map(|order| {
                let total_price = order
                    .lines()
                    .iter()
                    .map(|line| {
                        let price = state
                            .articles
                            .get(&line.article_id)
                            .map(Article::price)
                            .unwrap_or(0);
                        line.amount * price
                    })
                    .sum();
                let client = state
                    .clients
                    .get(&order.client_id())
                    .map(|c| c.name().to_string())
                    .unwrap_or_default();
                OrderSummary {
                    id: order.id(),
                    client,
                    line_count: order.lines().len() as i64,
                    total_price,
                    created_at: order.created_at(),
                }
            })
            .collect())
    }
}

struct PendingOrder {
    id: OrderId,
    client_id: ClientId,
    lines: Vec<OrderLine>,
}

/// One placement attempt. Holds the store lock; dropping the value releases
/// it and every staged change evaporates with the value, which is the
/// in-memory equivalent of a rollback.
struct MemoryPlacementUow {
    guard: OwnedMutexGuard<ShopState>,
    /// Staged copy of the article ledger; decrements land here first.
    articles: BTreeMap<ArticleId, Article>,
    pending: Option<PendingOrder>,
}

#[async_trait]
impl PlacementUow for MemoryPlacementUow {
    async fn allocate_order_id(&mut self) -> Result<OrderId, StoreError> {
        Ok(self
            .guard
            .orders
            .keys()
            .next_back()
            .copied()
            .unwrap_or(OrderId::new(0))
            .next())
    }

    async fn insert_order(
        &mut self,
        order_id: OrderId,
        client_id: ClientId,
    ) -> Result<(), StoreError> {
        if !self.guard.clients.contains_key(&client_id) {
            return Err(StoreError::UnknownClient(client_id));
        }
        if self.pending.is_some() {
            return Err(StoreError::Backend(
                "placement already staged an order".to_string(),
            ));
        }
        self.pending = Some(PendingOrder {
            id: order_id,
            client_id,
            lines: Vec::new(),
        });
        Ok(())
    }

    async fn current_quantity(&mut self, article_id: ArticleId) -> Result<i64, StoreError> {
        self.articles
            .get(&article_id)
            .map(Article::quantity)
            .ok_or(StoreError::ArticleNotFound(article_id))
    }

    async fn decrement_stock(
        &mut self,
        article_id: ArticleId,
        amount: i64,
    ) -> Result<(), StoreError> {
        let article = self
            .articles
            .get_mut(&article_id)
            .ok_or(StoreError::ArticleNotFound(article_id))?;

        match article.decrement(amount) {
            Decrement::Applied { .. } => Ok(()),
            Decrement::Insufficient { available } => Err(StoreError::InsufficientStock {
                article_id,
                requested: amount,
                available,
            }),
        }
    }

    async fn insert_line(
        &mut self,
        order_id: OrderId,
        article_id: ArticleId,
        amount: i64,
    ) -> Result<(), StoreError> {
        let pending = self
            .pending
            .as_mut()
            .ok_or_else(|| StoreError::Backend("no order staged".to_string()))?;
        if pending.id != order_id {
            return Err(StoreError::Backend(format!(
                "line targets order {order_id}, staged order is {}",
                pending.id
            )));
        }
        pending.lines.push(OrderLine { article_id, amount });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryPlacementUow {
            mut guard,
            articles,
            pending,
        } = *self;

        guard.articles = articles;
        if let Some(p) = pending {
            guard
                .orders
                .insert(p.id, Order::new(p.id, p.client_id, Utc::now(), p.lines));
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        // Dropping the guard discards the staged copy.
        Ok(())
    }
}
