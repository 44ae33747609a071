//! Unified configuration for the orchestrator: session, delegation, tool
//! execution, transport retry, and thinking settings. Every section
//! defaults to its documented production value, so an empty TOML document
//! — or no file at all — produces a working configuration.
//!
//! This crate has no dependencies on other internal crates; conversion from
//! [`WrenConfig`] sections into the concrete types other crates expect (a
//! `wren_llm::RetryConfig`, a semaphore permit count, and so on) happens at
//! the integration boundary, not here.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod loader;
pub mod prelude;
mod types;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::{
    DelegationSection, RetrySection, SessionSection, ThinkingLevel, ToolsSection,
    TransportSection, WrenConfig,
};

impl WrenConfig {
    /// Parse and validate a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the TOML is malformed or the parsed
    /// configuration fails validation.
    pub fn load_str(toml: &str) -> ConfigResult<Self> {
        loader::load_str(toml)
    }

    /// Parse and validate a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, its TOML is
    /// malformed, or the parsed configuration fails validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
