//! A `MemoryPort` that persists each key to its own JSON file, surviving a
//! process restart. File layout matches the reference shape: one
//! `history.<key>.json` per key under a root directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::{MemoryError, MemoryResult};
use crate::port::MemoryPort;

const FILE_PREFIX: &str = "history.";
const FILE_SUFFIX: &str = ".json";

/// File-backed `MemoryPort`: one `history.<key>.json` file per key under
/// `root`, written atomically (temp file + rename) and serialized per key
/// by an in-process lock so concurrent appenders never clobber each other.
pub struct FileMemoryStore {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FileMemoryStore {
    /// A store rooted at `root`. The directory is created lazily on first
    /// write; it need not exist yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), locks: DashMap::new() }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{FILE_PREFIX}{key}{FILE_SUFFIX}"))
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks.entry(key.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    async fn read_file<T>(&self, path: &Path) -> MemoryResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(error.into()),
        }
    }

    async fn write_file<T>(&self, path: PathBuf, items: &[T]) -> MemoryResult<()>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec_pretty(items)?;
        write_atomic(&self.root, path, bytes).await
    }
}

fn validate_key(key: &str) -> MemoryResult<()> {
    if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(MemoryError::InvalidKey(key.to_string()));
    }
    Ok(())
}

async fn write_atomic(root: &Path, path: PathBuf, bytes: Vec<u8>) -> MemoryResult<()> {
    let dir = root.to_path_buf();
    let result = tokio::task::spawn_blocking(move || -> MemoryResult<()> {
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&path).map_err(|error| error.error)?;
        Ok(())
    })
    .await
    .map_err(|error| MemoryError::Io(std::io::Error::other(error)))?;

    if let Err(error) = &result {
        tracing::warn!(%error, "failed to persist memory file");
    }
    result
}

#[async_trait]
impl<T> MemoryPort<T> for FileMemoryStore
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> MemoryResult<Vec<T>> {
        validate_key(key)?;
        self.read_file(&self.file_path(key)).await
    }

    async fn set(&self, key: &str, items: Vec<T>) -> MemoryResult<()> {
        validate_key(key)?;
        let _guard = self.lock_for(key).lock_owned().await;
        self.write_file(self.file_path(key), &items).await
    }

    async fn append(&self, key: &str, item: T) -> MemoryResult<()> {
        validate_key(key)?;
        let _guard = self.lock_for(key).lock_owned().await;
        let path = self.file_path(key);
        let mut items: Vec<T> = self.read_file(&path).await?;
        items.push(item);
        self.write_file(path, &items).await
    }

    async fn delete(&self, key: &str) -> MemoryResult<()> {
        validate_key(key)?;
        let _guard = self.lock_for(key).lock_owned().await;
        match tokio::fs::remove_file(self.file_path(key)).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => {
                tracing::warn!(key, %error, "failed to delete memory file");
                Err(error.into())
            }
        }
    }

    async fn keys(&self) -> MemoryResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(key) = name.strip_prefix(FILE_PREFIX).and_then(|rest| rest.strip_suffix(FILE_SUFFIX)) {
                keys.push(key.to_string());
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        text: String,
    }

    fn entry(text: &str) -> Entry {
        Entry { text: text.to_string() }
    }

    #[tokio::test]
    async fn append_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        store.append("conv-1", entry("hi")).await.unwrap();
        store.append("conv-1", entry("there")).await.unwrap();
        let items: Vec<Entry> = store.get("conv-1").await.unwrap();
        assert_eq!(items, vec![entry("hi"), entry("there")]);
    }

    #[tokio::test]
    async fn survives_a_simulated_process_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileMemoryStore::new(dir.path());
            store.append("conv-1", entry("persisted")).await.unwrap();
        }
        let reopened = FileMemoryStore::new(dir.path());
        let items: Vec<Entry> = reopened.get("conv-1").await.unwrap();
        assert_eq!(items, vec![entry("persisted")]);
    }

    #[tokio::test]
    async fn rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        let result: MemoryResult<Vec<Entry>> = store.get("../escape").await;
        assert!(matches!(result, Err(MemoryError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn delete_of_a_missing_key_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        let result: MemoryResult<()> = MemoryPort::<Entry>::delete(&store, "absent").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn keys_lists_only_files_written_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        store.append("a", entry("1")).await.unwrap();
        store.append("b", entry("2")).await.unwrap();
        let mut keys = store.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn satisfies_the_memory_port_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        wren_test::memory_port_contract_suite::<FileMemoryStore>(&store).await;
    }
}
