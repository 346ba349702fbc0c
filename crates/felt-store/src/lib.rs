//! Key/value persistence for sessions and table snapshots.
//!
//! Two key families exist: `session:<sessionId>` and `room:<tableId>`,
//! each holding a serialized JSON record. The [`Store`] contract is
//! deliberately tiny; callers never learn which backend they got.
//!
//! ## Backends
//!
//! - [`PgStore`] — a single upserting table in PostgreSQL
//! - [`MemoryStore`] — process-local map, the fallback
//!
//! Backend selection is one-shot: [`connect`] probes the durable store
//! once at startup and falls back to memory for the process lifetime.
//! Later durable-store failures are logged, never retried.
mod memory;
mod postgres;

pub use memory::*;
pub use postgres::*;

use std::sync::Arc;

/// Key prefix for persisted session records.
pub const SESSION_PREFIX: &str = "session:";
/// Key prefix for persisted table snapshots.
pub const ROOM_PREFIX: &str = "room:";

/// The persistence contract: durable when available, in-memory otherwise.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> anyhow::Result<()>;
    async fn del(&self, key: &str) -> anyhow::Result<()>;
    async fn keys_with_prefix(&self, prefix: &str) -> anyhow::Result<Vec<String>>;
}

/// Probes the durable store once; any failure means the in-memory
/// fallback for the rest of the process. Warns once, as promised.
pub async fn connect(url: Option<&str>) -> Arc<dyn Store> {
    match url {
        None => {
            log::info!("[store] no durable store configured, using memory");
            Arc::new(MemoryStore::new())
        }
        Some(url) => match PgStore::connect(url).await {
            Ok(store) => {
                log::info!("[store] durable store connected");
                Arc::new(store)
            }
            Err(e) => {
                log::warn!("[store] durable store unreachable ({}), falling back to memory", e);
                Arc::new(MemoryStore::new())
            }
        },
    }
}
