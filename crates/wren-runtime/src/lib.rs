//! The Orchestrator: the turn loop that ties the LLM, Tool, Memory, Event,
//! Metrics, and Approval ports together, manages context-window pressure,
//! and serves as the delegation service sub-agent tools call through.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
mod context;
mod error;
mod orchestrator;
mod payload;
mod pool;
pub mod prelude;

pub use config::{
    RuntimeConfig, DEFAULT_DELEGATION_TIMEOUT_MS, DEFAULT_KEEP_RECENT_COUNT,
    DEFAULT_MAX_CONCURRENT_SUBAGENTS, DEFAULT_MAX_CONCURRENT_TOOLS, DEFAULT_MAX_CONTEXT_TOKENS,
    DEFAULT_MAX_DELEGATION_DEPTH, DEFAULT_MAX_ITERATIONS, DEFAULT_SUMMARIZATION_THRESHOLD,
    MIN_BACKGROUND_SESSION_RETENTION,
};
pub use context::{ContextBuilder, ContextStats, SummarizationResult};
pub use error::{RuntimeError, RuntimeResult};
pub use orchestrator::{Orchestrator, SendOptions, SendOutcome};
pub use payload::UserMessagePayload;
pub use pool::DelegationPool;
