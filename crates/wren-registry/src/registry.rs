//! `AgentRegistry`: an in-memory cache over a `TemplateStore`, mirroring the
//! load-once-then-serve-from-cache shape of a configuration manager.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{RegistryError, RegistryResult};
use crate::store::TemplateStore;
use crate::template::AgentTemplate;

/// Caches `AgentTemplate`s in memory in front of a [`TemplateStore`]. Call
/// [`AgentRegistry::refresh`] once at startup (or whenever templates may
/// have changed on disk); reads thereafter are served from the cache.
pub struct AgentRegistry {
    cache: RwLock<HashMap<String, Arc<AgentTemplate>>>,
    store: Arc<dyn TemplateStore>,
}

impl AgentRegistry {
    /// A registry backed by `store`, with an empty cache until the first
    /// [`AgentRegistry::refresh`] or [`AgentRegistry::get`] populates it.
    #[must_use]
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { cache: RwLock::new(HashMap::new()), store }
    }

    /// Reload every template from the store, replacing the cache wholesale.
    pub async fn refresh(&self) -> RegistryResult<()> {
        let templates = self.store.list().await?;
        let mut cache = self.cache.write().await;
        cache.clear();
        for template in templates {
            cache.insert(template.id_or_default().to_string(), Arc::new(template));
        }
        Ok(())
    }

    /// Fetch a template by id, falling back to the store on a cache miss.
    pub async fn get(&self, id: &str) -> RegistryResult<Arc<AgentTemplate>> {
        if let Some(template) = self.cache.read().await.get(id).cloned() {
            return Ok(template);
        }

        let template = Arc::new(self.store.load(id).await?);
        self.cache.write().await.insert(id.to_string(), template.clone());
        Ok(template)
    }

    /// Register a new template, persisting it and adding it to the cache.
    /// Fails if a cached template with the same id already exists.
    pub async fn register(&self, template: AgentTemplate) -> RegistryResult<Arc<AgentTemplate>> {
        let id = template.id_or_default().to_string();
        if self.cache.read().await.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }

        self.store.save(&template).await?;
        let template = Arc::new(template);
        self.cache.write().await.insert(id, template.clone());
        Ok(template)
    }

    /// List every cached template.
    pub async fn list(&self) -> Vec<Arc<AgentTemplate>> {
        self.cache.read().await.values().cloned().collect()
    }

    /// Remove a template from both the store and the cache.
    pub async fn remove(&self, id: &str) -> RegistryResult<()> {
        self.store.delete(id).await?;
        self.cache.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileTemplateStore;

    fn template(id: &str) -> AgentTemplate {
        AgentTemplate::from_yaml("systemPrompt: hi\n").unwrap().with_id(id)
    }

    #[tokio::test]
    async fn register_then_get_serves_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let registry = AgentRegistry::new(Arc::new(FileTemplateStore::new(dir.path())));
        registry.register(template("reviewer")).await.unwrap();

        let fetched = registry.get("reviewer").await.unwrap();
        assert_eq!(fetched.system_prompt, "hi");
    }

    #[tokio::test]
    async fn registering_a_duplicate_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let registry = AgentRegistry::new(Arc::new(FileTemplateStore::new(dir.path())));
        registry.register(template("reviewer")).await.unwrap();

        let result = registry.register(template("reviewer")).await;
        assert!(matches!(result, Err(RegistryError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn refresh_picks_up_templates_written_directly_to_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileTemplateStore::new(dir.path()));
        store.save(&template("writer")).await.unwrap();

        let registry = AgentRegistry::new(store);
        assert!(registry.list().await.is_empty());
        registry.refresh().await.unwrap();
        assert_eq!(registry.list().await.len(), 1);
    }

    #[tokio::test]
    async fn remove_clears_both_store_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let registry = AgentRegistry::new(Arc::new(FileTemplateStore::new(dir.path())));
        registry.register(template("reviewer")).await.unwrap();
        registry.remove("reviewer").await.unwrap();

        assert!(registry.list().await.is_empty());
        let result = registry.get("reviewer").await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }
}
