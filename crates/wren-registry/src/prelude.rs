//! Convenient re-export of the most commonly used items in this crate.

// Errors
pub use crate::{RegistryError, RegistryResult};

// Templates and specialist configuration
pub use crate::{AgentTemplate, DelegatingDefaults, SpecialistAgentConfig};

// Registry and storage
pub use crate::{AgentRegistry, FileTemplateStore, TemplateStore};
