//! Service configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Order service configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port for the read-only query API
    pub http_port: u16,
    /// NATS server URL
    pub nats_url: String,
    /// JetStream stream holding order messages
    pub nats_stream: String,
    /// Subject the orders are published on
    pub nats_subject: String,
    /// Durable consumer name; survives restarts
    pub nats_durable: String,
    /// Seconds before an unacknowledged message is redelivered
    pub ack_wait_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            nats_url: std::env::var("NATS_URL")
                .unwrap_or_else(|_| "nats://localhost:4222".into()),
            nats_stream: std::env::var("NATS_STREAM").unwrap_or_else(|_| "ORDERS".into()),
            nats_subject: std::env::var("NATS_SUBJECT").unwrap_or_else(|_| "orders".into()),
            nats_durable: std::env::var("NATS_DURABLE")
                .unwrap_or_else(|_| "order-service-durable".into()),
            ack_wait_secs: std::env::var("ACK_WAIT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }
}
