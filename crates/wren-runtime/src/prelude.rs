//! Convenient re-export of the most commonly used items in this crate.

// Errors
pub use crate::{RuntimeError, RuntimeResult};

// Runtime
pub use crate::{Orchestrator, SendOptions, SendOutcome, UserMessagePayload};

// Delegation
pub use crate::DelegationPool;

// Configuration
pub use crate::{
    RuntimeConfig, DEFAULT_DELEGATION_TIMEOUT_MS, DEFAULT_KEEP_RECENT_COUNT,
    DEFAULT_MAX_CONCURRENT_SUBAGENTS, DEFAULT_MAX_CONCURRENT_TOOLS, DEFAULT_MAX_CONTEXT_TOKENS,
    DEFAULT_MAX_DELEGATION_DEPTH, DEFAULT_MAX_ITERATIONS, DEFAULT_SUMMARIZATION_THRESHOLD,
    MIN_BACKGROUND_SESSION_RETENTION,
};

// Context management
pub use crate::{ContextBuilder, ContextStats, SummarizationResult};
