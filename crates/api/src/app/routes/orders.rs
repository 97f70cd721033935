use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_orders().await {
        Ok(orders) => {
            let body: Vec<serde_json::Value> =
                orders.iter().map(dto::order_summary_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PlaceOrderRequest>,
) -> axum::response::Response {
    let request = match body.into_domain() {
        Ok(r) => r,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", e.to_string())
        }
    };

    match services.placement().place_order(&request).await {
        Ok(order_id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "order_id": order_id.as_i64(),
            })),
        )
            .into_response(),
        Err(e) => errors::placement_error_to_response(e),
    }
}
