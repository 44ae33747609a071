//! Configuration sections.
//!
//! Every section implements [`Default`] with the value documented in the
//! external interface, so a bare `[section]` header (or an absent one
//! entirely) in TOML produces a working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WrenConfig {
    /// Conversation session limits and persistence.
    pub session: SessionSection,
    /// Sub-agent delegation limits.
    pub delegation: DelegationSection,
    /// Tool execution limits.
    pub tools: ToolsSection,
    /// HTTP transport behaviour.
    pub transport: TransportSection,
    /// Whether the orchestrator surfaces model reasoning as `llm_chunk` events.
    pub thinking: ThinkingLevel,
}

/// Conversation session limits and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSection {
    /// Persist memory across process restarts.
    pub mem_persist: bool,
    /// Maximum tool-call iterations before the orchestrator gives up and
    /// returns the last assistant message.
    pub max_iterations: u32,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self { mem_persist: false, max_iterations: 25 }
    }
}

/// Sub-agent delegation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DelegationSection {
    /// Maximum nesting depth for recursive `assign_task` delegation.
    pub max_depth: u32,
    /// Default wall-clock budget for a delegated child run, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DelegationSection {
    fn default() -> Self {
        Self { max_depth: 3, timeout_ms: 300_000 }
    }
}

/// Tool execution limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolsSection {
    /// Maximum number of tool calls executed concurrently within one batch.
    pub max_concurrent: usize,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self { max_concurrent: 3 }
    }
}

/// HTTP transport behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportSection {
    /// Retry/backoff policy for the streaming transport.
    pub retry: RetrySection,
}

/// Exponential backoff policy, mirroring the streaming transport's contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrySection {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Delay ceiling, in milliseconds; backoff never exceeds this.
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay on each successive attempt.
    pub multiplier: f64,
    /// Jitter fraction in `[0, 1]`; the applied delay is `delay ± jitter * delay`.
    pub jitter: f64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 100_000,
            multiplier: 2.0,
            jitter: 0.2,
        }
    }
}

/// Controls whether the orchestrator emits model "reasoning" deltas as
/// `llm_chunk` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkingLevel {
    /// Reasoning deltas are suppressed entirely.
    #[default]
    Off,
    /// Low reasoning effort.
    Low,
    /// Medium reasoning effort.
    Medium,
    /// High reasoning effort.
    High,
}
