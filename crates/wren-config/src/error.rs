//! Errors produced while loading or validating a [`crate::WrenConfig`].

use thiserror::Error;

/// Failure modes for config loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file's TOML was malformed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A parsed value violated a documented invariant.
    #[error("invalid config at `{field}`: {message}")]
    Validation {
        /// Dotted path to the offending field, e.g. `"tools.max_concurrent"`.
        field: String,
        /// Human-readable description of the violation.
        message: String,
    },
}

/// Convenience alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
