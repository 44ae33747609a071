//! The Memory Port and Metadata Port: ordered per-key conversation history
//! and single-value-per-key metadata, each with an in-memory and (for
//! memory) a file-backed implementation.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod file;
mod in_memory;
mod port;
pub mod prelude;

pub use error::{MemoryError, MemoryResult};
pub use file::FileMemoryStore;
pub use in_memory::{InMemoryMetadataStore, InMemoryStore};
pub use port::{MemoryPort, MetadataPort};
