//! Agent registry error types.

/// Errors from template loading, validation, and delegation materialization.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No template is registered under the given id.
    #[error("unknown agent template: {0}")]
    NotFound(String),

    /// A template with this id already exists.
    #[error("agent template already exists: {0}")]
    AlreadyExists(String),

    /// The template's YAML failed to parse, or was missing `systemPrompt`.
    #[error("invalid agent template: {0}")]
    InvalidTemplate(String),

    /// `SpecialistAgentConfig::materialize` was asked to exceed the
    /// delegation depth bound.
    #[error("delegation depth {depth} exceeds maximum {max}")]
    DepthExceeded {
        /// The depth that was requested.
        depth: u32,
        /// The configured maximum.
        max: u32,
    },

    /// Reading or writing the backing directory failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored YAML did not deserialize into an `AgentTemplate`.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
