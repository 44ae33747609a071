//! The `TemplateStore` port and its YAML-file-per-template implementation.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{RegistryError, RegistryResult};
use crate::template::AgentTemplate;

/// Persists and lists `AgentTemplate`s. Implemented by [`FileTemplateStore`]
/// for production use; a registry's caller may substitute an in-memory stub
/// for tests.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// List every template the store currently holds.
    async fn list(&self) -> RegistryResult<Vec<AgentTemplate>>;

    /// Load a single template by id.
    async fn load(&self, id: &str) -> RegistryResult<AgentTemplate>;

    /// Persist a template, creating or overwriting its file.
    async fn save(&self, template: &AgentTemplate) -> RegistryResult<()>;

    /// Remove a template's file. Not an error if it was already absent.
    async fn delete(&self, id: &str) -> RegistryResult<()>;
}

/// One YAML file per template, named `<id>.yaml`, under a root directory.
pub struct FileTemplateStore {
    root: PathBuf,
}

impl FileTemplateStore {
    /// A store rooted at `root`. The directory is created lazily on first
    /// save; it need not exist yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.yaml"))
    }
}

#[async_trait]
impl TemplateStore for FileTemplateStore {
    async fn list(&self) -> RegistryResult<Vec<AgentTemplate>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let mut templates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("yaml") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else { continue };

            match self.load(stem).await {
                Ok(template) => templates.push(template),
                Err(error) => tracing::warn!(id = stem, %error, "failed to load agent template"),
            }
        }
        Ok(templates)
    }

    async fn load(&self, id: &str) -> RegistryResult<AgentTemplate> {
        let path = self.path_for(id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistryError::NotFound(id.to_string()))
            }
            Err(error) => return Err(error.into()),
        };
        Ok(AgentTemplate::from_yaml(&content)?.with_id(id))
    }

    async fn save(&self, template: &AgentTemplate) -> RegistryResult<()> {
        let id = template.id_or_default().to_string();
        tokio::fs::create_dir_all(&self.root).await?;
        let yaml = serde_yaml::to_string(template)?;
        tokio::fs::write(self.path_for(&id), yaml).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> RegistryResult<()> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
