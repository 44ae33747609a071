//! Convenient re-export of the most commonly used items in this crate.

// Errors
pub use crate::{ConfigError, ConfigResult};

// Configuration sections
pub use crate::{
    DelegationSection, RetrySection, SessionSection, ThinkingLevel, ToolsSection,
    TransportSection, WrenConfig,
};
