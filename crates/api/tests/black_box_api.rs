use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use orderdesk_api::app;
use orderdesk_api::app::services::AppServices;
use orderdesk_clients::Client;
use orderdesk_core::{ArticleId, ClientId};
use orderdesk_infra::store::InMemoryStore;
use orderdesk_inventory::Article;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Build the prod router around the given store, bound to an ephemeral
    /// port.
    async fn spawn(store: InMemoryStore) -> Self {
        let services = Arc::new(AppServices::new(Arc::new(store)));
        let router = app::router(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Store with client 1 ("Acme") and two articles: 100 (price 250, qty 5)
/// and 200 (price 1000, qty 2).
async fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .seed_client(Client::new(ClientId::new(1), "Acme", "Main Street 1", "Vienna", "AT").unwrap())
        .await;
    store
        .seed_article(Article::new(ArticleId::new(100), "Sunflower seeds, 1kg", 250, 5).unwrap())
        .await;
    store
        .seed_article(Article::new(ArticleId::new(200), "Terracotta pot, 20cm", 1_000, 2).unwrap())
        .await;
    store
}

#[tokio::test]
async fn health_endpoint_responds() {
    let srv = TestServer::spawn(seeded_store().await).await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn articles_listing_returns_the_catalog() {
    let srv = TestServer::spawn(seeded_store().await).await;

    let res = reqwest::get(format!("{}/articles", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let articles = body.as_array().unwrap();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0]["id"], 100);
    assert_eq!(articles[0]["description"], "Sunflower seeds, 1kg");
    assert_eq!(articles[0]["price"], 250);
    assert_eq!(articles[0]["amount"], 5);
}

#[tokio::test]
async fn clients_listing_returns_all_clients() {
    let srv = TestServer::spawn(seeded_store().await).await;

    let res = reqwest::get(format!("{}/clients", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let clients = body.as_array().unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0]["id"], 1);
    assert_eq!(clients[0]["name"], "Acme");
    assert_eq!(clients[0]["city"], "Vienna");
}

#[tokio::test]
async fn placing_an_order_decrements_stock_and_shows_up_in_the_listing() {
    let srv = TestServer::spawn(seeded_store().await).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/placeOrder", srv.base_url))
        .json(&json!({
            "client_id": 1,
            "lines": [
                { "article_id": 100, "amount": 3 },
                { "article_id": 200, "amount": 2 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["order_id"], 1);

    // Stock went down.
    let articles: serde_json::Value = client
        .get(format!("{}/articles", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(articles[0]["amount"], 2);
    assert_eq!(articles[1]["amount"], 0);

    // The order listing carries client name, line count and total price.
    let orders: serde_json::Value = client
        .get(format!("{}/orders", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], 1);
    assert_eq!(orders[0]["client"], "Acme");
    assert_eq!(orders[0]["lines"], 2);
    assert_eq!(orders[0]["price"], 3 * 250 + 2 * 1_000);
}

#[tokio::test]
async fn insufficient_stock_is_unprocessable_and_changes_nothing() {
    let srv = TestServer::spawn(seeded_store().await).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/placeOrder", srv.base_url))
        .json(&json!({
            "client_id": 1,
            "lines": [
                { "article_id": 100, "amount": 1 },
                { "article_id": 200, "amount": 99 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");

    // Full rollback: the first line's decrement was undone too.
    let articles: serde_json::Value = client
        .get(format!("{}/articles", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(articles[0]["amount"], 5);
    assert_eq!(articles[1]["amount"], 2);

    let orders: serde_json::Value = client
        .get(format!("{}/orders", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unknown_client_is_not_found() {
    let srv = TestServer::spawn(seeded_store().await).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/placeOrder", srv.base_url))
        .json(&json!({
            "client_id": 42,
            "lines": [{ "article_id": 100, "amount": 1 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unknown_client");
}

#[tokio::test]
async fn negative_amount_is_rejected_before_entering_the_core() {
    let srv = TestServer::spawn(seeded_store().await).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/placeOrder", srv.base_url))
        .json(&json!({
            "client_id": 1,
            "lines": [{ "article_id": 100, "amount": -2 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_request");

    // Nothing was touched.
    let articles: serde_json::Value = client
        .get(format!("{}/articles", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(articles[0]["amount"], 5);
}
