//! PostgreSQL order repository
//!
//! One aggregate maps to four tables: orders, delivery, payment, items.
//! `save` runs in a single transaction so the aggregate is either fully
//! persisted or not at all. The order row upsert always locks the row, so
//! concurrent saves of the same uid serialize before the item rows are
//! replaced (delete then insert) — redelivering the same message leaves
//! exactly one copy of every row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::cache::OrderSource;
use crate::consumer::OrderWriter;
use crate::error::StoreError;
use crate::model::{Delivery, Order, OrderItem, Payment};

/// Durable, idempotent storage for order aggregates
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

/// Header columns of the orders table; sub-records are fetched separately
#[derive(sqlx::FromRow)]
struct OrderRow {
    order_uid: String,
    track_number: String,
    entry: String,
    locale: String,
    internal_signature: String,
    customer_id: String,
    delivery_service: String,
    shardkey: String,
    sm_id: i32,
    date_created: Option<DateTime<Utc>>,
    oof_shard: String,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist the full aggregate in one transaction
    pub async fn save(&self, order: &Order) -> Result<(), StoreError> {
        self.save_tx(order).await.map_err(StoreError::Persistence)
    }

    async fn save_tx(&self, order: &Order) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // The no-op update locks the order row even when it is already
        // committed; a DO NOTHING conflict takes no lock there, and two
        // overlapping redeliveries would each miss the other's item rows.
        sqlx::query(
            r#"
            INSERT INTO orders (order_uid, track_number, entry, locale, internal_signature,
                customer_id, delivery_service, shardkey, sm_id, date_created, oof_shard)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (order_uid) DO UPDATE SET order_uid = EXCLUDED.order_uid
            "#,
        )
        .bind(&order.order_uid)
        .bind(&order.track_number)
        .bind(&order.entry)
        .bind(&order.locale)
        .bind(&order.internal_signature)
        .bind(&order.customer_id)
        .bind(&order.delivery_service)
        .bind(&order.shardkey)
        .bind(order.sm_id)
        .bind(order.date_created)
        .bind(&order.oof_shard)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO delivery (order_uid, name, phone, zip, city, address, region, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (order_uid) DO NOTHING
            "#,
        )
        .bind(&order.order_uid)
        .bind(&order.delivery.name)
        .bind(&order.delivery.phone)
        .bind(&order.delivery.zip)
        .bind(&order.delivery.city)
        .bind(&order.delivery.address)
        .bind(&order.delivery.region)
        .bind(&order.delivery.email)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO payment (order_uid, transaction, request_id, currency, provider,
                amount, payment_dt, bank, delivery_cost, goods_total, custom_fee)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (order_uid) DO NOTHING
            "#,
        )
        .bind(&order.order_uid)
        .bind(&order.payment.transaction)
        .bind(&order.payment.request_id)
        .bind(&order.payment.currency)
        .bind(&order.payment.provider)
        .bind(order.payment.amount)
        .bind(order.payment.payment_dt)
        .bind(&order.payment.bank)
        .bind(order.payment.delivery_cost)
        .bind(order.payment.goods_total)
        .bind(order.payment.custom_fee)
        .execute(&mut *tx)
        .await?;

        // Replace item rows so redelivery cannot duplicate them
        sqlx::query("DELETE FROM items WHERE order_uid = $1")
            .bind(&order.order_uid)
            .execute(&mut *tx)
            .await?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO items (order_uid, chrt_id, track_number, price, rid, name,
                    sale, size, total_price, nm_id, brand, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(&order.order_uid)
            .bind(item.chrt_id)
            .bind(&item.track_number)
            .bind(item.price)
            .bind(&item.rid)
            .bind(&item.name)
            .bind(item.sale)
            .bind(&item.size)
            .bind(item.total_price)
            .bind(item.nm_id)
            .bind(&item.brand)
            .bind(item.status)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Reconstruct one aggregate; `None` when no order row matches
    pub async fn get(&self, order_uid: &str) -> Result<Option<Order>, StoreError> {
        self.get_inner(order_uid)
            .await
            .map_err(StoreError::Unavailable)
    }

    async fn get_inner(&self, order_uid: &str) -> Result<Option<Order>, sqlx::Error> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT order_uid, track_number, entry, locale, internal_signature,
                   customer_id, delivery_service, shardkey, sm_id, date_created, oof_shard
            FROM orders WHERE order_uid = $1
            "#,
        )
        .bind(order_uid)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let delivery = sqlx::query_as::<_, Delivery>(
            "SELECT name, phone, zip, city, address, region, email FROM delivery WHERE order_uid = $1",
        )
        .bind(order_uid)
        .fetch_one(&self.pool)
        .await?;

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT transaction, request_id, currency, provider, amount, payment_dt,
                   bank, delivery_cost, goods_total, custom_fee
            FROM payment WHERE order_uid = $1
            "#,
        )
        .bind(order_uid)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT chrt_id, track_number, price, rid, name, sale, size,
                   total_price, nm_id, brand, status
            FROM items WHERE order_uid = $1 ORDER BY id
            "#,
        )
        .bind(order_uid)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Order {
            order_uid: row.order_uid,
            track_number: row.track_number,
            entry: row.entry,
            delivery,
            payment,
            items,
            locale: row.locale,
            internal_signature: row.internal_signature,
            customer_id: row.customer_id,
            delivery_service: row.delivery_service,
            shardkey: row.shardkey,
            sm_id: row.sm_id,
            date_created: row.date_created,
            oof_shard: row.oof_shard,
        }))
    }

    /// Enumerate every aggregate, newest first; fail-fast on any error
    pub async fn get_all(&self) -> Result<Vec<Order>, StoreError> {
        let uids: Vec<String> = sqlx::query_scalar(
            "SELECT order_uid FROM orders ORDER BY date_created DESC NULLS LAST",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Unavailable)?;

        let mut orders = Vec::with_capacity(uids.len());
        for uid in &uids {
            if let Some(order) = self.get(uid).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }
}

#[async_trait]
impl OrderWriter for OrderRepository {
    async fn save_order(&self, order: &Order) -> Result<(), StoreError> {
        self.save(order).await
    }
}

#[async_trait]
impl OrderSource for OrderRepository {
    async fn load_all(&self) -> Result<Vec<Order>, StoreError> {
        self.get_all().await
    }
}
