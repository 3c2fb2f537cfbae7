//! In-memory order cache
//!
//! Process-local map from `order_uid` to the full aggregate. Populated by a
//! full reload from the store at startup and kept current by the ingestion
//! path. Plain lookup structure, no eviction: the dataset is bounded by
//! realistic order volume and fits in memory.

use dashmap::DashMap;

use crate::error::StoreError;
use crate::model::Order;

/// Source the cache reloads from at startup; the repository implements it
#[async_trait::async_trait]
pub trait OrderSource: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Order>, StoreError>;
}

/// Concurrent-safe `order_uid → Order` map
#[derive(Default)]
pub struct OrderCache {
    orders: DashMap<String, Order>,
}

impl OrderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; last set wins for a given uid
    pub fn set(&self, order_uid: String, order: Order) {
        self.orders.insert(order_uid, order);
    }

    pub fn get(&self, order_uid: &str) -> Option<Order> {
        self.orders.get(order_uid).map(|entry| entry.value().clone())
    }

    /// Snapshot of all entries; iteration order is unspecified
    pub fn get_all(&self) -> Vec<Order> {
        self.orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn size(&self) -> usize {
        self.orders.len()
    }

    /// Merge every record from the store into the cache
    ///
    /// On enumeration failure the existing contents are untouched and the
    /// error goes back to the caller, who decides whether to keep starting
    /// with an empty or partial cache.
    pub async fn reload_from<S: OrderSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<usize, StoreError> {
        let orders = source.load_all().await?;
        for order in orders {
            self.orders.insert(order.order_uid.clone(), order);
        }
        Ok(self.orders.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample_order(uid: &str) -> Order {
        use crate::model::{Delivery, Payment};
        Order {
            order_uid: uid.to_string(),
            track_number: "WBILMTESTTRACK".into(),
            entry: "WBIL".into(),
            delivery: Delivery {
                name: "Test Testov".into(),
                phone: "+9720000000".into(),
                zip: "2639809".into(),
                city: "Kiryat Mozkin".into(),
                address: "Ploshad Mira 15".into(),
                region: "Kraiot".into(),
                email: "test@gmail.com".into(),
            },
            payment: Payment {
                transaction: uid.to_string(),
                request_id: String::new(),
                currency: "USD".into(),
                provider: "wbpay".into(),
                amount: 1817,
                payment_dt: 1637907727,
                bank: "alpha".into(),
                delivery_cost: 1500,
                goods_total: 317,
                custom_fee: 0,
            },
            items: Vec::new(),
            locale: "en".into(),
            internal_signature: String::new(),
            customer_id: "test".into(),
            delivery_service: "meest".into(),
            shardkey: "9".into(),
            sm_id: 99,
            date_created: Some(chrono::Utc::now()),
            oof_shard: "1".into(),
        }
    }

    struct FixedSource {
        orders: Vec<Order>,
    }

    #[async_trait::async_trait]
    impl OrderSource for FixedSource {
        async fn load_all(&self) -> Result<Vec<Order>, StoreError> {
            Ok(self.orders.clone())
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl OrderSource for FailingSource {
        async fn load_all(&self) -> Result<Vec<Order>, StoreError> {
            Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
        }
    }

    #[test]
    fn set_then_get_returns_equal_record() {
        let cache = OrderCache::new();
        let order = sample_order("uid-1");
        cache.set(order.order_uid.clone(), order.clone());

        assert_eq!(cache.get("uid-1"), Some(order));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn get_unknown_uid_is_none() {
        let cache = OrderCache::new();
        assert!(cache.get("nonexistent").is_none());
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let cache = OrderCache::new();
        cache.set("uid-1".into(), sample_order("uid-1"));

        let mut updated = sample_order("uid-1");
        updated.customer_id = "another".into();
        cache.set("uid-1".into(), updated.clone());

        assert_eq!(cache.size(), 1);
        assert_eq!(cache.get("uid-1"), Some(updated));
    }

    #[test]
    fn get_all_snapshots_every_entry() {
        let cache = OrderCache::new();
        cache.set("a".into(), sample_order("a"));
        cache.set("b".into(), sample_order("b"));

        let all = cache.get_all();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|o| o.order_uid == "a"));
        assert!(all.iter().any(|o| o.order_uid == "b"));
    }

    #[tokio::test]
    async fn reload_populates_from_source() {
        let source = FixedSource {
            orders: (0..5).map(|i| sample_order(&format!("uid-{i}"))).collect(),
        };
        let cache = OrderCache::new();

        let loaded = cache.reload_from(&source).await.unwrap();
        assert_eq!(loaded, 5);
        assert_eq!(cache.size(), 5);
        for i in 0..5 {
            assert!(cache.get(&format!("uid-{i}")).is_some());
        }
    }

    #[tokio::test]
    async fn failed_reload_preserves_existing_entries() {
        let cache = OrderCache::new();
        cache.set("kept".into(), sample_order("kept"));

        let err = cache.reload_from(&FailingSource).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(cache.size(), 1);
        assert!(cache.get("kept").is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_sets_and_gets_on_distinct_uids() {
        let cache = Arc::new(OrderCache::new());

        let writers: Vec<_> = (0..100)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let uid = format!("uid-{i}");
                    cache.set(uid.clone(), sample_order(&uid));
                })
            })
            .collect();
        for handle in writers {
            handle.await.unwrap();
        }

        assert_eq!(cache.size(), 100);

        let readers: Vec<_> = (0..100)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let uid = format!("uid-{i}");
                    let order = cache.get(&uid).expect("entry must exist");
                    assert_eq!(order.order_uid, uid);
                })
            })
            .collect();
        for handle in readers {
            handle.await.unwrap();
        }
    }
}
