//! Application state for the order service

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::OrderCache;
use crate::db::OrderRepository;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Durable order storage
    pub repo: OrderRepository,
    /// Read cache the query API serves from
    pub cache: Arc<OrderCache>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: OrderRepository::new(pool),
            cache: Arc::new(OrderCache::new()),
        }
    }
}
