//! Error types for the order service
//!
//! Each layer has its own small enum; `?` propagation does the bridging.
//! Message-level failures never abort the subscription loop, and store
//! failures on the read path are distinguished from failed writes so the
//! startup reload can degrade gracefully.

use thiserror::Error;

/// Persistence-layer error
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or enumerated (read path)
    #[error("order store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// A transactional write failed and was rolled back (write path)
    #[error("order persistence failed: {0}")]
    Persistence(#[source] sqlx::Error),
}

/// Per-message ingestion error, contained to the message that caused it
#[derive(Debug, Error)]
pub enum IngestError {
    /// Malformed payload; the message is dropped without acknowledgment
    #[error("malformed order payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Save failed; the message is left unacknowledged for redelivery
    #[error(transparent)]
    Store(#[from] StoreError),
}
