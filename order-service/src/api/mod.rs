//! Read-only query API over the order cache

pub mod health;
pub mod orders;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the query router; every endpoint reads from the cache only
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/orders", get(orders::list_orders))
        .route("/api/orders/{order_uid}", get(orders::get_order))
        .route("/api/stats", get(orders::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
