//! The Memory Port and Metadata Port contracts.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::MemoryResult;

/// Ordered, append-only storage keyed by conversation (or any other string
/// key the caller chooses). Backs the "memory appends within a conversation
/// are totally ordered" guarantee: every implementation must preserve the
/// order items were appended in.
#[async_trait]
pub trait MemoryPort<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Fetch the ordered item list for `key`, or an empty list if absent.
    async fn get(&self, key: &str) -> MemoryResult<Vec<T>>;

    /// Replace the entire ordered list stored under `key`.
    async fn set(&self, key: &str, items: Vec<T>) -> MemoryResult<()>;

    /// Append a single item to the end of `key`'s list.
    async fn append(&self, key: &str, item: T) -> MemoryResult<()>;

    /// Remove `key` and all of its items.
    async fn delete(&self, key: &str) -> MemoryResult<()>;

    /// List every key currently holding data.
    async fn keys(&self) -> MemoryResult<Vec<String>>;
}

/// Single-value-per-key storage for arbitrary metadata (agent templates,
/// conversation settings, and the like), with whole-store snapshot/restore
/// for backup and migration.
#[async_trait]
pub trait MetadataPort<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Fetch the value stored under `key`, if any.
    async fn get(&self, key: &str) -> MemoryResult<Option<T>>;

    /// Store (or overwrite) the value for `key`.
    async fn set(&self, key: &str, value: T) -> MemoryResult<()>;

    /// Remove `key`.
    async fn delete(&self, key: &str) -> MemoryResult<()>;

    /// List every key currently holding a value.
    async fn keys(&self) -> MemoryResult<Vec<String>>;

    /// Remove every key.
    async fn clear(&self) -> MemoryResult<()>;

    /// Export the entire store as a key → value map.
    async fn export_snapshot(&self) -> MemoryResult<HashMap<String, T>>;

    /// Replace the entire store's contents with `snapshot`.
    async fn import_snapshot(&self, snapshot: HashMap<String, T>) -> MemoryResult<()>;
}
