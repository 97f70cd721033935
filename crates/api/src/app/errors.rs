use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use orderdesk_infra::placement::PlacementError;
use orderdesk_infra::store::StoreError;

/// Map a failed placement to a response.
///
/// Business failures get meaningful status codes; the payload always keeps
/// the `{"error": ..., "message": ...}` shape so callers can branch on the
/// code without parsing prose.
pub fn placement_error_to_response(err: PlacementError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        PlacementError::UnknownClient(_) => {
            json_error(StatusCode::NOT_FOUND, "unknown_client", message)
        }
        PlacementError::ArticleNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "article_not_found", message)
        }
        PlacementError::InsufficientStock { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_stock", message)
        }
        PlacementError::ConcurrencyConflict(_) => {
            json_error(StatusCode::CONFLICT, "conflict", message)
        }
        PlacementError::StoreUnavailable(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", message)
        }
        PlacementError::Internal(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
    }
}

/// Map a failed read-only query to a response.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        StoreError::ArticleNotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        StoreError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        StoreError::Unavailable(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", message)
        }
        _ => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
