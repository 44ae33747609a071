//! Process-lifetime `MemoryPort`/`MetadataPort` implementations backed by a
//! concurrent hash map. Nothing survives a restart; use [`crate::file`] for
//! that.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::MemoryResult;
use crate::port::{MemoryPort, MetadataPort};

/// `MemoryPort` backed by a `DashMap<String, Vec<T>>`.
#[derive(Debug, Default)]
pub struct InMemoryStore<T> {
    entries: DashMap<String, Vec<T>>,
}

impl<T> InMemoryStore<T> {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }
}

#[async_trait]
impl<T> MemoryPort<T> for InMemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> MemoryResult<Vec<T>> {
        Ok(self.entries.get(key).map(|items| items.clone()).unwrap_or_default())
    }

    async fn set(&self, key: &str, items: Vec<T>) -> MemoryResult<()> {
        self.entries.insert(key.to_string(), items);
        Ok(())
    }

    async fn append(&self, key: &str, item: T) -> MemoryResult<()> {
        self.entries.entry(key.to_string()).or_default().push(item);
        Ok(())
    }

    async fn delete(&self, key: &str) -> MemoryResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn keys(&self) -> MemoryResult<Vec<String>> {
        Ok(self.entries.iter().map(|entry| entry.key().clone()).collect())
    }
}

/// `MetadataPort` backed by a `DashMap<String, T>`.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore<T> {
    entries: DashMap<String, T>,
}

impl<T> InMemoryMetadataStore<T> {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }
}

#[async_trait]
impl<T> MetadataPort<T> for InMemoryMetadataStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> MemoryResult<Option<T>> {
        Ok(self.entries.get(key).map(|value| value.clone()))
    }

    async fn set(&self, key: &str, value: T) -> MemoryResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> MemoryResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn keys(&self) -> MemoryResult<Vec<String>> {
        Ok(self.entries.iter().map(|entry| entry.key().clone()).collect())
    }

    async fn clear(&self) -> MemoryResult<()> {
        self.entries.clear();
        Ok(())
    }

    async fn export_snapshot(&self) -> MemoryResult<HashMap<String, T>> {
        Ok(self.entries.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect())
    }

    async fn import_snapshot(&self, snapshot: HashMap<String, T>) -> MemoryResult<()> {
        self.entries.clear();
        for (key, value) in snapshot {
            self.entries.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_preserves_order() {
        let store: InMemoryStore<i32> = InMemoryStore::new();
        store.append("conv-1", 1).await.unwrap();
        store.append("conv-1", 2).await.unwrap();
        store.append("conv-1", 3).await.unwrap();
        assert_eq!(store.get("conv-1").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_key_returns_empty_not_error() {
        let store: InMemoryStore<i32> = InMemoryStore::new();
        assert_eq!(store.get("absent").await.unwrap(), Vec::<i32>::new());
    }

    #[tokio::test]
    async fn set_replaces_the_whole_list() {
        let store: InMemoryStore<i32> = InMemoryStore::new();
        store.append("k", 1).await.unwrap();
        store.set("k", vec![9, 9]).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), vec![9, 9]);
    }

    #[tokio::test]
    async fn delete_removes_the_key() {
        let store: InMemoryStore<i32> = InMemoryStore::new();
        store.append("k", 1).await.unwrap();
        store.delete("k").await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn metadata_snapshot_round_trips() {
        let store: InMemoryMetadataStore<String> = InMemoryMetadataStore::new();
        store.set("a", "one".to_string()).await.unwrap();
        store.set("b", "two".to_string()).await.unwrap();
        let snapshot = store.export_snapshot().await.unwrap();

        let restored: InMemoryMetadataStore<String> = InMemoryMetadataStore::new();
        restored.import_snapshot(snapshot).await.unwrap();
        assert_eq!(restored.get("a").await.unwrap(), Some("one".to_string()));
        assert_eq!(restored.get("b").await.unwrap(), Some("two".to_string()));
    }

    #[tokio::test]
    async fn clear_empties_the_metadata_store() {
        let store: InMemoryMetadataStore<i32> = InMemoryMetadataStore::new();
        store.set("a", 1).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn satisfies_the_memory_port_contract() {
        let store: InMemoryStore<wren_llm::Message> = InMemoryStore::new();
        wren_test::memory_port_contract_suite(&store).await;
    }
}
