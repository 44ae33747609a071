//! Wren Prelude - a single import for the common types across the Wren
//! workspace.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wren_prelude::*;
//! ```
//!
//! This pulls in the public surface of every crate in the workspace that
//! declares its own `prelude` module. It does not re-export `wren-test`;
//! pull that in directly as a dev-dependency where needed.
//!
//! # Per-Crate Preludes
//!
//! Each crate also exposes its own `prelude` module for callers who only
//! need one corner of the workspace:
//!
//! - [`wren_core::prelude`]
//! - [`wren_events::prelude`]
//! - [`wren_llm::prelude`]
//! - [`wren_metrics::prelude`]
//! - [`wren_approval::prelude`]
//! - [`wren_tools::prelude`]
//! - [`wren_memory::prelude`]
//! - [`wren_registry::prelude`]
//! - [`wren_config::prelude`]
//! - [`wren_runtime::prelude`]

#![warn(missing_docs)]

pub use wren_approval::prelude::*;
pub use wren_config::prelude::*;
pub use wren_core::prelude::*;
pub use wren_events::prelude::*;
pub use wren_llm::prelude::*;
pub use wren_memory::prelude::*;
pub use wren_metrics::prelude::*;
pub use wren_registry::prelude::*;
pub use wren_runtime::prelude::*;
pub use wren_tools::prelude::*;
