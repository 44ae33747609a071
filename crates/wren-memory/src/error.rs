//! Memory Port error types.

/// Errors from memory/metadata persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The requested key does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The key contains characters that would escape the store's root
    /// directory (path separators, `..`).
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Reading or writing the backing file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored JSON did not deserialize into the expected shape, or a
    /// value failed to serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for memory/metadata operations.
pub type MemoryResult<T> = Result<T, MemoryError>;
