//! Convenient re-export of the most commonly used items in this crate.

// Errors
pub use crate::{MemoryError, MemoryResult};

// Ports
pub use crate::{MemoryPort, MetadataPort};

// Implementations
pub use crate::{FileMemoryStore, InMemoryMetadataStore, InMemoryStore};
