//! `AgentTemplate` and `SpecialistAgentConfig`, plus the `AgentRegistry`
//! cache and a YAML-file-per-template `TemplateStore`.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
pub mod prelude;
mod registry;
mod specialist;
mod store;
mod template;

pub use error::{RegistryError, RegistryResult};
pub use registry::AgentRegistry;
pub use specialist::{DelegatingDefaults, SpecialistAgentConfig};
pub use store::{FileTemplateStore, TemplateStore};
pub use template::AgentTemplate;
