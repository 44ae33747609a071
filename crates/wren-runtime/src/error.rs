//! The orchestrator's error type.
//!
//! `send()` only ever resolves to `Err` for cancellation or an unrecovered
//! transport failure; every other internal error (a memory write, a
//! registry lookup, an approval hook) is logged, turned into an
//! [`wren_events::AgentEvent::Error`], and absorbed so the turn loop can
//! keep going. The `#[from]` conversions below exist so internal helpers
//! can use `?` freely; most of their error paths never reach `send()`'s
//! caller.

use thiserror::Error;

/// Everything that can end a `send()` call early.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The underlying LLM transport failed in a way retries couldn't fix.
    #[error(transparent)]
    Llm(#[from] wren_llm::LlmError),

    /// A memory port operation failed.
    #[error(transparent)]
    Memory(#[from] wren_memory::MemoryError),

    /// An agent template lookup failed.
    #[error(transparent)]
    Registry(#[from] wren_registry::RegistryError),

    /// The approval hook failed or was dropped.
    #[error(transparent)]
    Approval(#[from] wren_approval::ApprovalError),

    /// The call was cancelled, either by the caller or a deadline.
    #[error(transparent)]
    Aborted(#[from] wren_core::Aborted),

    /// The turn loop exhausted its iteration budget. Reserved for callers
    /// that want to match on it explicitly; the orchestrator's own loop
    /// never constructs this variant, it resolves `Ok` and emits an
    /// `error { kind: "iteration_limit" }` event instead.
    #[error("reached the iteration limit ({0} iterations) without a final response")]
    IterationLimit(u32),

    /// A delegation request was rejected (depth, policy, or missing
    /// delegation service).
    #[error("delegation failed: {0}")]
    Delegation(String),
}

/// Shorthand for the orchestrator's result type.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
