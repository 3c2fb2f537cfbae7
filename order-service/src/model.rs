//! Order aggregate as it travels over the wire and through storage
//!
//! The shape mirrors the inbound JSON payload exactly; there is no
//! validation layer. `order_uid` is the sole identity of the aggregate,
//! `Delivery` and `Payment` are 1:1 sub-records, `items` is 1:N.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Root aggregate, identified by `order_uid`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<OrderItem>,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i32,
    /// Not required on the wire; the consumer stamps it when absent
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    pub oof_shard: String,
}

/// Delivery address, 1:1 with the order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment details, 1:1 with the order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Payment {
    pub transaction: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

/// One order line, 1:N with the order, identified by `rid` within it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct OrderItem {
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub rid: String,
    pub name: String,
    pub sale: i32,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ORDER: &str = r#"{
        "order_uid": "b563feb7b2b84b6test",
        "track_number": "WBILMTESTTRACK",
        "entry": "WBIL",
        "delivery": {
            "name": "Test Testov",
            "phone": "+9720000000",
            "zip": "2639809",
            "city": "Kiryat Mozkin",
            "address": "Ploshad Mira 15",
            "region": "Kraiot",
            "email": "test@gmail.com"
        },
        "payment": {
            "transaction": "b563feb7b2b84b6test",
            "request_id": "",
            "currency": "USD",
            "provider": "wbpay",
            "amount": 1817,
            "payment_dt": 1637907727,
            "bank": "alpha",
            "delivery_cost": 1500,
            "goods_total": 317,
            "custom_fee": 0
        },
        "items": [
            {
                "chrt_id": 9934930,
                "track_number": "WBILMTESTTRACK",
                "price": 453,
                "rid": "ab4219087a764ae0btest",
                "name": "Mascaras",
                "sale": 30,
                "size": "0",
                "total_price": 317,
                "nm_id": 2389212,
                "brand": "Vivienne Sabo",
                "status": 202
            }
        ],
        "locale": "en",
        "internal_signature": "",
        "customer_id": "test",
        "delivery_service": "meest",
        "shardkey": "9",
        "sm_id": 99,
        "date_created": "2021-11-26T06:22:19Z",
        "oof_shard": "1"
    }"#;

    #[test]
    fn decodes_full_payload() {
        let order: Order = serde_json::from_str(SAMPLE_ORDER).unwrap();
        assert_eq!(order.order_uid, "b563feb7b2b84b6test");
        assert_eq!(order.payment.amount, 1817);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].rid, "ab4219087a764ae0btest");
        assert!(order.date_created.is_some());
    }

    #[test]
    fn missing_date_created_defaults_to_none() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE_ORDER).unwrap();
        value.as_object_mut().unwrap().remove("date_created");
        let order: Order = serde_json::from_value(value).unwrap();
        assert!(order.date_created.is_none());
    }

    #[test]
    fn json_round_trip_preserves_every_field() {
        let order: Order = serde_json::from_str(SAMPLE_ORDER).unwrap();
        let encoded = serde_json::to_string(&order).unwrap();
        let decoded: Order = serde_json::from_str(&encoded).unwrap();
        assert_eq!(order, decoded);
    }

    #[test]
    fn malformed_payload_is_rejected() {
        assert!(serde_json::from_str::<Order>(r#"{"order_uid": 42}"#).is_err());
        assert!(serde_json::from_slice::<Order>(b"not json at all").is_err());
    }
}
