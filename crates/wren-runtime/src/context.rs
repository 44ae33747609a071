//! Conversation-length management: deciding when a history is too large for
//! the model's context window and collapsing its oldest span into a single
//! synthetic summary message.

use wren_core::CancelToken;
use wren_llm::{LlmProvider, Message};

use crate::error::RuntimeResult;

const MIN_THRESHOLD: f32 = 0.5;
const MAX_THRESHOLD: f32 = 0.95;

/// Tracks and reduces a conversation's estimated token footprint.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    max_context_tokens: usize,
    summarization_threshold: f32,
    keep_recent_count: usize,
}

/// What [`ContextBuilder::summarize`] did to the history.
#[derive(Debug, Clone)]
pub enum SummarizationResult {
    /// The history was short enough that nothing was summarized.
    Skipped,
    /// `summarized_count` older messages were collapsed into one summary.
    Summarized {
        /// How many messages were replaced.
        summarized_count: usize,
    },
}

/// A point-in-time read on a conversation's context utilization.
#[derive(Debug, Clone, Copy)]
pub struct ContextStats {
    /// Estimated tokens the current history (plus system prompt) would cost.
    pub current_tokens: usize,
    /// The configured budget.
    pub max_tokens: usize,
    /// `current_tokens / max_tokens`, as a fraction.
    pub utilization: f32,
    /// Number of messages in the history.
    pub message_count: usize,
    /// Whether `utilization` has crossed the summarization threshold.
    pub needs_summarization: bool,
}

impl ContextStats {
    /// `utilization` expressed as a percentage, rounded for display.
    #[must_use]
    pub fn utilization_percent(&self) -> u32 {
        (self.utilization * 100.0).round() as u32
    }
}

impl ContextBuilder {
    /// Build a context manager for a `max_context_tokens`-sized window,
    /// using the documented default threshold and recent-message floor.
    #[must_use]
    pub fn new(max_context_tokens: usize) -> Self {
        Self {
            max_context_tokens,
            summarization_threshold: crate::config::DEFAULT_SUMMARIZATION_THRESHOLD,
            keep_recent_count: crate::config::DEFAULT_KEEP_RECENT_COUNT,
        }
    }

    /// Override the utilization fraction that triggers summarization,
    /// clamped to a sane `[0.5, 0.95]` range.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.summarization_threshold = threshold.clamp(MIN_THRESHOLD, MAX_THRESHOLD);
        self
    }

    /// Override how many of the most recent messages are never summarized away.
    #[must_use]
    pub fn keep_recent(mut self, count: usize) -> Self {
        self.keep_recent_count = count;
        self
    }

    /// Whether `history` (plus `system`) has crossed the summarization threshold.
    #[must_use]
    pub fn needs_summarization<P: LlmProvider + ?Sized>(&self, provider: &P, history: &[Message], system: &str) -> bool {
        let estimated = estimate_tokens(provider, history, system);
        estimated as f32 > self.max_context_tokens as f32 * self.summarization_threshold
    }

    /// Collapse the oldest span of `history` (everything but the last
    /// `keep_recent_count` messages) into one synthetic system message
    /// produced by `provider`. A no-op if the history is already shorter
    /// than the recent-message floor.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::RuntimeError::Llm`] if the summarization
    /// call itself fails; the caller decides whether that's fatal.
    pub async fn summarize<P: LlmProvider + ?Sized>(
        &self,
        history: &mut Vec<Message>,
        provider: &P,
        cancel: &CancelToken,
    ) -> RuntimeResult<SummarizationResult> {
        if history.len() <= self.keep_recent_count {
            return Ok(SummarizationResult::Skipped);
        }

        let split_at = history.len() - self.keep_recent_count;
        let older: Vec<Message> = history.drain(0..split_at).collect();
        let summarized_count = older.len();

        let prompt = format_messages_for_summary(&older);
        let summary = provider.complete_simple(&prompt, cancel).await?;

        history.insert(0, Message::system(format!("[Previous conversation summary]\n{summary}")));

        Ok(SummarizationResult::Summarized { summarized_count })
    }

    /// A snapshot of the current context utilization, for observability.
    #[must_use]
    pub fn stats<P: LlmProvider + ?Sized>(&self, provider: &P, history: &[Message], system: &str) -> ContextStats {
        let current_tokens = estimate_tokens(provider, history, system);
        let utilization = if self.max_context_tokens == 0 {
            0.0
        } else {
            current_tokens as f32 / self.max_context_tokens as f32
        };
        ContextStats {
            current_tokens,
            max_tokens: self.max_context_tokens,
            utilization,
            message_count: history.len(),
            needs_summarization: self.needs_summarization(provider, history, system),
        }
    }
}

fn estimate_tokens<P: LlmProvider + ?Sized>(provider: &P, history: &[Message], system: &str) -> usize {
    let mut total = provider.count_tokens(system);
    for message in history {
        total += provider.count_tokens(&message.content.as_text());
    }
    total
}

fn format_messages_for_summary(messages: &[Message]) -> String {
    let mut prompt = String::from(
        "Summarize the following conversation history concisely, preserving any facts, \
         decisions, or open threads a continuation would need. Respond with the summary only.\n\n",
    );
    for message in messages {
        let role = match message.role {
            wren_llm::MessageRole::System => "system",
            wren_llm::MessageRole::User => "user",
            wren_llm::MessageRole::Assistant => "assistant",
            wren_llm::MessageRole::Tool => "tool",
        };
        prompt.push_str(&format!("{role}: {}\n", message.content.as_text()));
    }
    prompt
}
