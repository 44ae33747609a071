//! Runtime configuration: the knobs a constructed [`crate::Orchestrator`]
//! reads on every turn, plus the bridge from [`wren_config::WrenConfig`]'s
//! on-disk sections into this crate's concrete types.

use std::path::PathBuf;
use std::time::Duration;

use wren_config::{RetrySection, WrenConfig};
use wren_llm::RetryConfig;

/// Default cap on tool-call iterations within a single `send()` call.
pub const DEFAULT_MAX_ITERATIONS: u32 = 25;
/// Default context budget, in estimated tokens, before summarization kicks in.
pub const DEFAULT_MAX_CONTEXT_TOKENS: usize = 100_000;
/// Default number of most-recent messages a summarization pass always keeps verbatim.
pub const DEFAULT_KEEP_RECENT_COUNT: usize = 10;
/// Default utilization fraction of `max_context_tokens` that triggers summarization.
pub const DEFAULT_SUMMARIZATION_THRESHOLD: f32 = 0.85;
/// Default bound on tool calls executed concurrently within one batch.
pub const DEFAULT_MAX_CONCURRENT_TOOLS: usize = 3;
/// Default bound on sub-agents running concurrently across a conversation tree.
pub const DEFAULT_MAX_CONCURRENT_SUBAGENTS: usize = 4;
/// Default maximum delegation nesting depth.
pub const DEFAULT_MAX_DELEGATION_DEPTH: u32 = 3;
/// Default wall-clock budget for a single delegated child run.
pub const DEFAULT_DELEGATION_TIMEOUT_MS: u64 = 300_000;
/// Minimum retention window a completed background delegation's result is
/// kept before it may be evicted, regardless of whether it was claimed.
pub const MIN_BACKGROUND_SESSION_RETENTION: Duration = Duration::from_secs(3600);

/// Everything the turn loop needs that isn't a collaborator (provider,
/// tool port, memory port, ...). Constructed once per conversation.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// The system prompt prefixed to every LLM call for this conversation.
    pub system_prompt: String,
    /// Root directory tool bodies treat as their sandbox.
    pub workspace_root: PathBuf,
    /// Maximum tool-call iterations before the loop gives up and returns
    /// the last assistant message.
    pub max_iterations: u32,
    /// Context budget, in estimated tokens, before summarization kicks in.
    pub max_context_tokens: usize,
    /// Number of most-recent messages a summarization pass always keeps.
    pub keep_recent_count: usize,
    /// Utilization fraction of `max_context_tokens` that triggers summarization.
    pub summarization_threshold: f32,
    /// Whether the loop summarizes automatically when the threshold is crossed.
    pub auto_summarize: bool,
    /// Bound on tool calls executed concurrently within one batch.
    pub max_concurrent_tools: usize,
    /// Bound on sub-agents running concurrently across a conversation tree.
    pub max_concurrent_subagents: usize,
    /// Maximum delegation nesting depth.
    pub max_delegation_depth: u32,
    /// Wall-clock budget for a single delegated child run.
    pub default_delegation_timeout: Duration,
    /// Retry/backoff policy handed to the transport when the provider is built.
    pub retry: RetryConfig,
    /// Whether model reasoning deltas are surfaced as `llm_chunk` events.
    pub thinking: wren_config::ThinkingLevel,
    /// Whether this conversation's memory should persist across restarts.
    pub mem_persist: bool,
    /// Tool names visible to the model for this conversation.
    pub enabled_tools: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            workspace_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_context_tokens: DEFAULT_MAX_CONTEXT_TOKENS,
            keep_recent_count: DEFAULT_KEEP_RECENT_COUNT,
            summarization_threshold: DEFAULT_SUMMARIZATION_THRESHOLD,
            auto_summarize: true,
            max_concurrent_tools: DEFAULT_MAX_CONCURRENT_TOOLS,
            max_concurrent_subagents: DEFAULT_MAX_CONCURRENT_SUBAGENTS,
            max_delegation_depth: DEFAULT_MAX_DELEGATION_DEPTH,
            default_delegation_timeout: Duration::from_millis(DEFAULT_DELEGATION_TIMEOUT_MS),
            retry: RetryConfig::default(),
            thinking: wren_config::ThinkingLevel::default(),
            mem_persist: false,
            enabled_tools: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Bridge a loaded [`WrenConfig`] into a [`RuntimeConfig`], filling in
    /// the fields the config crate doesn't know about (system prompt,
    /// workspace root, enabled tools — those are wiring decisions made by
    /// whoever is constructing the orchestrator, not on-disk settings).
    #[must_use]
    pub fn from_wren_config(
        config: &WrenConfig,
        system_prompt: impl Into<String>,
        workspace_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            workspace_root: workspace_root.into(),
            max_iterations: config.session.max_iterations,
            mem_persist: config.session.mem_persist,
            max_concurrent_tools: config.tools.max_concurrent.max(1),
            max_delegation_depth: config.delegation.max_depth,
            default_delegation_timeout: Duration::from_millis(config.delegation.timeout_ms),
            retry: retry_config_from(&config.transport.retry),
            thinking: config.thinking,
            ..Self::default()
        }
    }
}

/// Translate a [`RetrySection`] (on-disk, millisecond-typed) into the
/// transport's [`RetryConfig`] (in-memory, `Duration`-typed).
#[must_use]
pub fn retry_config_from(section: &RetrySection) -> RetryConfig {
    RetryConfig {
        max_retries: section.max_retries,
        base_delay: Duration::from_millis(section.base_delay_ms),
        max_delay: Duration::from_millis(section.max_delay_ms),
        multiplier: section.multiplier,
        jitter_factor: section.jitter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_iterations, 25);
        assert_eq!(config.max_delegation_depth, 3);
        assert!(config.auto_summarize);
    }

    #[test]
    fn bridging_an_empty_wren_config_preserves_its_defaults() {
        let wren_config = WrenConfig::default();
        let runtime_config = RuntimeConfig::from_wren_config(&wren_config, "you are helpful", "/workspace");
        assert_eq!(runtime_config.max_iterations, 25);
        assert_eq!(runtime_config.max_delegation_depth, 3);
        assert_eq!(runtime_config.default_delegation_timeout, Duration::from_secs(300));
        assert_eq!(runtime_config.system_prompt, "you are helpful");
    }

    #[test]
    fn retry_section_converts_millisecond_fields_to_durations() {
        let section = RetrySection {
            max_retries: 5,
            base_delay_ms: 250,
            max_delay_ms: 10_000,
            multiplier: 1.5,
            jitter: 0.1,
        };
        let retry = retry_config_from(&section);
        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.base_delay, Duration::from_millis(250));
        assert_eq!(retry.max_delay, Duration::from_millis(10_000));
    }
}
