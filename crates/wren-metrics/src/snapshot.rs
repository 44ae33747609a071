//! The immutable snapshot type handed to subscribers and carried on events.

use serde::{Deserialize, Serialize};

/// The model's declared context limit alongside how much of it is in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextWindow {
    /// Maximum tokens the provider's context accepts.
    pub limit: u64,
    /// Tokens currently occupied by the rendered prompt.
    pub usage: u64,
}

/// Usage figures for a single LLM call, as fed to
/// [`super::MetricsAccumulator::record_llm_call`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LlmCallUsage {
    /// Input tokens billed for this call.
    pub prompt_tokens: u64,
    /// Output tokens billed for this call.
    pub completion_tokens: u64,
    /// Tokens served from a provider-side cache, if reported.
    pub cached_tokens: u64,
    /// Reasoning tokens, for providers that bill them separately.
    pub reasoning_tokens: u64,
    /// Estimated dollar cost of this call, if the provider reports pricing.
    pub cost: f64,
}

/// Running totals over a single conversation.
///
/// Every mutator on [`super::MetricsAccumulator`] produces a fresh, fully
/// independent copy of this struct for its subscribers — no snapshot ever
/// aliases another, so a subscriber holding one from an earlier mutation is
/// never surprised by it changing underneath it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Sum of prompt and completion tokens across all LLM calls.
    pub total_tokens: u64,
    /// Prompt tokens accumulated across all LLM calls.
    pub prompt_tokens: u64,
    /// Completion tokens accumulated across all LLM calls.
    pub completion_tokens: u64,
    /// Cache-served tokens accumulated across all LLM calls.
    pub cached_tokens: u64,
    /// Reasoning tokens accumulated across all LLM calls.
    pub reasoning_tokens: u64,
    /// Estimated total dollar cost.
    pub cost: f64,
    /// Number of LLM calls recorded.
    pub llm_call_count: u64,
    /// Number of tool calls recorded.
    pub tool_call_count: u64,
    /// Number of completed `send()` requests recorded.
    pub request_count: u64,
    /// Cumulative wall-clock time of completed requests, in milliseconds.
    pub total_time_ms: u64,
    /// The most recently reported context-window occupancy, if any.
    pub context_window: Option<ContextWindow>,
}
