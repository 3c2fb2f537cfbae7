//! Order lookup endpoints
//!
//! All lookups hit the in-memory cache; an unknown uid is a 404, never an
//! internal error.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::model::Order;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("order not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// GET /api/orders
pub async fn list_orders(State(state): State<AppState>) -> Json<Vec<Order>> {
    Json(state.cache.get_all())
}

/// GET /api/orders/{order_uid}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_uid): Path<String>,
) -> Result<Json<Order>, ApiError> {
    state
        .cache
        .get(&order_uid)
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "total_orders": state.cache.size() }))
}
