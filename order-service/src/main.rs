use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use order_service::config::Config;
use order_service::consumer::OrderSubscriber;
use order_service::state::AppState;
use order_service::{api, consumer};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "order_service=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting order-service");

    let pool = connect_postgres(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Connected to PostgreSQL");

    let state = AppState::new(pool);

    // Rebuild the cache before accepting new messages; a failure degrades
    // to an empty cache rather than blocking startup
    match state.cache.reload_from(&state.repo).await {
        Ok(count) => tracing::info!("Cache restored from database, {count} orders"),
        Err(e) => tracing::warn!("Failed to restore cache from database: {e}"),
    }

    // Subscribe with retry; without NATS the service still serves reads
    match connect_subscriber(&config).await {
        Some(subscriber) => {
            let consumer_state = state.clone();
            tokio::spawn(async move {
                if let Err(e) = subscriber.run(consumer_state).await {
                    tracing::error!("Consumer loop error: {e}");
                }
            });
        }
        None => {
            tracing::warn!("Could not connect to NATS, starting without ingestion");
        }
    }

    // Start HTTP server (query API)
    let app = api::create_router(state);
    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("order-service HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Connect to PostgreSQL with a bounded retry loop
async fn connect_postgres(database_url: &str) -> Result<PgPool, BoxError> {
    let mut last_err: Option<sqlx::Error> = None;
    for attempt in 1..=CONNECT_ATTEMPTS {
        match PgPoolOptions::new()
            .max_connections(25)
            .connect(database_url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to PostgreSQL (attempt {attempt}/{CONNECT_ATTEMPTS}): {e}"
                );
                last_err = Some(e);
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }
    Err(last_err.map(Into::into).unwrap_or_else(|| "PostgreSQL unreachable".into()))
}

/// Connect the durable subscriber with a bounded retry loop; `None` when
/// every attempt fails
async fn connect_subscriber(config: &Config) -> Option<OrderSubscriber> {
    for attempt in 1..=CONNECT_ATTEMPTS {
        match consumer::OrderSubscriber::connect(config).await {
            Ok(subscriber) => return Some(subscriber),
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to NATS (attempt {attempt}/{CONNECT_ATTEMPTS}): {e}"
                );
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }
    None
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
