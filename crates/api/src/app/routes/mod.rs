use axum::{
    routing::{get, post},
    Router,
};

pub mod articles;
pub mod clients;
pub mod orders;
pub mod system;

/// Router for all endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::index))
        .route("/health", get(system::health))
        .route("/articles", get(articles::list_articles))
        .route("/clients", get(clients::list_clients))
        .route("/orders", get(orders::list_orders))
        .route("/placeOrder", post(orders::place_order))
}
