//! Persistent ordered store.
//!
//! The engine only needs a handful of primitives from its backing store:
//! scalar keys, append-only named lists read from the tail, and a two level
//! hash. Values are opaque strings (JSON documents in practice).

pub mod memory;
pub mod postgres;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type SharedStore = Arc<dyn Store>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Append to the tail of `list`, returning the new length.
    async fn push(&self, list: &str, value: &str) -> Result<u64>;

    /// The last `count` elements of `list` in head-to-tail order. Returns
    /// fewer when the list is shorter.
    async fn range_from_end(&self, list: &str, count: usize) -> Result<Vec<String>>;

    /// Every element of `list`, head first.
    async fn range_all(&self, list: &str) -> Result<Vec<String>>;

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()>;
}
