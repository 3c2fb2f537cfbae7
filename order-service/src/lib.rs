//! order-service — durable order ingestion with an in-memory read cache
//!
//! Consumes order messages from a durable NATS JetStream subject, persists
//! each aggregate transactionally into PostgreSQL and mirrors it into an
//! in-memory cache that a read-only HTTP API serves lookups from. The
//! cache is rebuilt from the store at startup.

pub mod api;
pub mod cache;
pub mod config;
pub mod consumer;
pub mod db;
pub mod error;
pub mod model;
pub mod state;
