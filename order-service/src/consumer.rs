//! NATS JetStream ingestion consumer
//!
//! Bridges the durable, at-least-once subject to the store and the cache.
//! Each message walks an explicit state machine: decode, stamp a missing
//! creation timestamp, persist, cache, acknowledge. A malformed payload is
//! dropped without ack, a failed save leaves the message pending so the
//! ack-wait window redelivers it, and an ack failure is logged only.

use std::time::Duration;

use async_nats::jetstream::{self, consumer::PullConsumer};
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;

use crate::cache::OrderCache;
use crate::config::Config;
use crate::error::{IngestError, StoreError};
use crate::model::Order;
use crate::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The one store capability the consumer needs
#[async_trait]
pub trait OrderWriter: Send + Sync {
    async fn save_order(&self, order: &Order) -> Result<(), StoreError>;
}

/// Terminal state of one message's processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Persisted, cached and acknowledged
    Acked,
    /// Undecodable payload, dropped without side effects
    DroppedMalformed,
    /// Save failed; left unacknowledged for transport redelivery
    LeftPending,
}

impl Outcome {
    /// Classify one ingestion attempt into its terminal state
    pub fn of(result: &Result<Order, IngestError>) -> Outcome {
        match result {
            Ok(_) => Outcome::Acked,
            Err(IngestError::Decode(_)) => Outcome::DroppedMalformed,
            Err(IngestError::Store(_)) => Outcome::LeftPending,
        }
    }
}

/// Decode, stamp, persist and cache one payload
///
/// Side-effect order matters: the cache is only written after a successful
/// save, so it never holds a record absent from the store.
pub async fn ingest_payload<W: OrderWriter + ?Sized>(
    payload: &[u8],
    store: &W,
    cache: &OrderCache,
) -> Result<Order, IngestError> {
    let mut order: Order = serde_json::from_slice(payload)?;

    if order.date_created.is_none() {
        order.date_created = Some(Utc::now());
    }

    store.save_order(&order).await?;
    cache.set(order.order_uid.clone(), order.clone());
    Ok(order)
}

/// Durable subscription on the orders subject
pub struct OrderSubscriber {
    consumer: PullConsumer,
}

impl OrderSubscriber {
    /// Connect and bind the durable consumer (creates stream and consumer
    /// when absent)
    pub async fn connect(config: &Config) -> Result<Self, BoxError> {
        let client = async_nats::connect(&config.nats_url).await?;
        let jetstream = jetstream::new(client);

        let stream = jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: config.nats_stream.clone(),
                subjects: vec![config.nats_subject.clone()],
                ..Default::default()
            })
            .await?;

        let consumer = stream
            .get_or_create_consumer(
                &config.nats_durable,
                jetstream::consumer::pull::Config {
                    durable_name: Some(config.nats_durable.clone()),
                    ack_wait: Duration::from_secs(config.ack_wait_secs),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            subject = %config.nats_subject,
            durable = %config.nats_durable,
            "subscribed to orders subject"
        );

        Ok(Self { consumer })
    }

    /// Consume until the stream ends; message handlers run concurrently and
    /// a failure inside one never aborts the loop
    pub async fn run(self, state: AppState) -> Result<(), BoxError> {
        let mut messages = self.consumer.messages().await?;

        while let Some(next) = messages.next().await {
            match next {
                Ok(message) => {
                    let state = state.clone();
                    tokio::spawn(async move {
                        handle_message(message, &state).await;
                    });
                }
                Err(e) => {
                    tracing::error!("message stream error: {e}");
                }
            }
        }

        Ok(())
    }
}

async fn handle_message(message: jetstream::Message, state: &AppState) -> Outcome {
    let result = ingest_payload(&message.payload, &state.repo, &state.cache).await;
    match &result {
        Ok(order) => {
            tracing::info!(order_uid = %order.order_uid, "order ingested");
            if let Err(e) = message.ack().await {
                tracing::warn!(order_uid = %order.order_uid, "failed to ack message: {e}");
            }
        }
        Err(IngestError::Decode(e)) => {
            tracing::warn!("dropping malformed order payload: {e}");
        }
        Err(IngestError::Store(e)) => {
            tracing::error!("failed to persist order, leaving message pending: {e}");
        }
    }
    Outcome::of(&result)
}
