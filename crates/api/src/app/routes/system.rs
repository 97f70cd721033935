use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;

pub async fn health() -> axum::response::Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}

/// Static index page listing the available endpoints.
pub async fn index() -> Html<&'static str> {
    Html(
        "<!doctype html>\n\
         <html><head><title>Orderdesk Webshop</title></head>\n\
         <body><h1>Orderdesk Webshop</h1>\n\
         <h2>Available endpoints:</h2><dl>\n\
         <dt>List all articles:</dt><dd><code>GET /articles</code></dd>\n\
         <dt>List all clients:</dt><dd><code>GET /clients</code></dd>\n\
         <dt>List all orders:</dt><dd><code>GET /orders</code></dd>\n\
         <dt>Place an order:</dt><dd><code>POST /placeOrder</code> with body\n\
         <code>{\"client_id\": 1, \"lines\": [{\"article_id\": 100, \"amount\": 3}]}</code></dd>\n\
         </dl></body></html>",
    )
}
