//! Synthetic order publisher
//!
//! Generates randomized sample orders and publishes them as JSON to the
//! orders subject, for exercising the service locally.

use std::time::Duration;

use async_nats::jetstream;
use chrono::Utc;
use rand::Rng;

use order_service::model::{Delivery, Order, OrderItem, Payment};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const NUM_ORDERS: usize = 40;

const NAMES: &[&str] = &[
    "Ivan Petrov", "Anna Smirnova", "Dmitry Ivanov", "Elena Kuznetsova",
    "Sergey Popov", "Maria Sokolova", "Alexander Volkov", "Olga Novikova",
];

const CITIES: &[&str] = &[
    "Moscow", "Saint Petersburg", "Novosibirsk", "Yekaterinburg",
    "Kazan", "Nizhny Novgorod", "Chelyabinsk", "Samara",
];

const STREETS: &[&str] = &[
    "Lenina St.", "Pushkina St.", "Kirova St.", "Sovetskaya St.",
    "Gagarina St.", "Mira St.", "Komsomolskaya St.", "Pobedy St.",
];

const PRODUCTS: &[(&str, &str, i64)] = &[
    ("Mascaras", "Vivienne Sabo", 453),
    ("Lipstick", "MAC", 890),
    ("Foundation", "Maybelline", 650),
    ("Perfume", "Chanel", 3500),
    ("Sunglasses", "Ray-Ban", 5200),
    ("Watch", "Casio", 2800),
    ("Sneakers", "Nike", 4500),
    ("Backpack", "Puma", 2100),
];

const CURRENCIES: &[&str] = &["USD", "EUR", "RUB"];
const BANKS: &[&str] = &["alpha", "sberbank", "tinkoff", "vtb"];
const PROVIDERS: &[&str] = &["wbpay", "yandexpay", "sberpay"];
const DELIVERY_SERVICES: &[&str] = &["meest", "cdek", "boxberry", "pochta", "dhl"];
const ENTRIES: &[&str] = &["WBIL", "WBMSK", "WBSPB", "WBNSK"];

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "publisher=info".into()),
        )
        .init();

    let nats_url = std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".into());
    let stream = std::env::var("NATS_STREAM").unwrap_or_else(|_| "ORDERS".into());
    let subject = std::env::var("NATS_SUBJECT").unwrap_or_else(|_| "orders".into());

    let client = async_nats::connect(&nats_url).await?;
    let jetstream = jetstream::new(client);

    jetstream
        .get_or_create_stream(jetstream::stream::Config {
            name: stream,
            subjects: vec![subject.clone()],
            ..Default::default()
        })
        .await?;

    tracing::info!("Connected to NATS, publishing {NUM_ORDERS} orders to '{subject}'");

    for num in 1..=NUM_ORDERS {
        let order = generate_sample_order(num);
        let payload = serde_json::to_vec(&order)?;

        jetstream
            .publish(subject.clone(), payload.into())
            .await?
            .await?;

        tracing::info!(
            "Published order {} (customer: {})",
            order.order_uid,
            order.delivery.name
        );
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    tracing::info!("All {NUM_ORDERS} orders published");
    Ok(())
}

fn generate_sample_order(num: usize) -> Order {
    let mut rng = rand::thread_rng();

    let order_uid = format!("b563feb7b2b84b6test{num}");
    let track_number = format!("WBILMTESTTRACK{num:05}");

    let item_count = rng.gen_range(1..=4);
    let mut goods_total = 0i64;
    let items: Vec<OrderItem> = (0..item_count)
        .map(|i| {
            let (name, brand, price) = PRODUCTS[rng.gen_range(0..PRODUCTS.len())];
            let sale = rng.gen_range(0..50);
            let total_price = price * (100 - i64::from(sale)) / 100;
            goods_total += total_price;
            OrderItem {
                chrt_id: rng.gen_range(1_000_000..10_000_000),
                track_number: track_number.clone(),
                price,
                rid: format!("{order_uid}-item{i}"),
                name: name.to_string(),
                sale,
                size: "0".to_string(),
                total_price,
                nm_id: rng.gen_range(1_000_000..10_000_000),
                brand: brand.to_string(),
                status: 202,
            }
        })
        .collect();

    let delivery_cost = i64::from(rng.gen_range(5..30)) * 100;
    let now = Utc::now();

    Order {
        order_uid: order_uid.clone(),
        track_number,
        entry: ENTRIES[rng.gen_range(0..ENTRIES.len())].to_string(),
        delivery: Delivery {
            name: NAMES[rng.gen_range(0..NAMES.len())].to_string(),
            phone: format!("+7{:010}", rng.gen_range(9_000_000_000u64..9_999_999_999)),
            zip: format!("{}", rng.gen_range(100_000..999_999)),
            city: CITIES[rng.gen_range(0..CITIES.len())].to_string(),
            address: format!(
                "{} {}",
                STREETS[rng.gen_range(0..STREETS.len())],
                rng.gen_range(1..200)
            ),
            region: CITIES[rng.gen_range(0..CITIES.len())].to_string(),
            email: format!("customer{num}@example.com"),
        },
        payment: Payment {
            transaction: order_uid,
            request_id: String::new(),
            currency: CURRENCIES[rng.gen_range(0..CURRENCIES.len())].to_string(),
            provider: PROVIDERS[rng.gen_range(0..PROVIDERS.len())].to_string(),
            amount: goods_total + delivery_cost,
            payment_dt: now.timestamp(),
            bank: BANKS[rng.gen_range(0..BANKS.len())].to_string(),
            delivery_cost,
            goods_total,
            custom_fee: 0,
        },
        items,
        locale: "en".to_string(),
        internal_signature: String::new(),
        customer_id: format!("customer{num}"),
        delivery_service: DELIVERY_SERVICES[rng.gen_range(0..DELIVERY_SERVICES.len())].to_string(),
        shardkey: format!("{}", rng.gen_range(1..10)),
        sm_id: rng.gen_range(1..100),
        date_created: Some(now),
        oof_shard: "1".to_string(),
    }
}
