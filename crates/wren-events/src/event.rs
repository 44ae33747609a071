//! The typed event stream emitted by the orchestrator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wren_core::{AgentId, ConversationId, MessageId, Timestamp, ToolCallId};
use wren_metrics::MetricsSnapshot;

/// Normalized token/cost usage attached to `llm_call_completed` and `done`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt (input) tokens.
    pub prompt_tokens: u64,
    /// Completion (output) tokens.
    pub completion_tokens: u64,
    /// `prompt_tokens + completion_tokens`, computed if the provider omits it.
    pub total_tokens: u64,
    /// Reasoning tokens, for providers that bill them separately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u64>,
    /// Estimated dollar cost of the call, if the provider reports pricing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// A single tool call requested by the model, as carried on `tool_calls`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallSummary {
    /// The id of this invocation, shared with its eventual `tool_result`.
    pub id: ToolCallId,
    /// The tool name being invoked.
    pub name: String,
    /// Raw JSON-string arguments as the model produced them.
    pub arguments: String,
}

/// The outcome of executing one tool call, as carried on `tool_result`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultSummary {
    /// The invocation this result answers.
    pub id: ToolCallId,
    /// The tool name that was invoked.
    pub name: String,
    /// Whether the tool body ran to completion or failed.
    pub status: ToolResultStatus,
    /// Wall-clock duration of the execution, in milliseconds.
    pub duration_ms: u64,
    /// The stringified or JSON-encoded result payload.
    pub result: Value,
}

/// `ToolExecutionResult.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultStatus {
    /// The tool ran and produced a result.
    Success,
    /// The tool failed; the error still flows back to the model as content.
    Error,
}

/// Schema version tag stamped on every [`EventEnvelope`], so long-lived
/// NDJSON consumers can detect a breaking change in the wire format.
pub const EVENT_SCHEMA_VERSION: u32 = 1;

/// Context shared by every event kind. Every event carries a conversation
/// and message id; sub-agent events additionally carry `agent_id` and the
/// parent `tool_call_id` they were spawned from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// The conversation this event belongs to.
    pub conversation_id: ConversationId,
    /// The in-flight `send()` call this event belongs to.
    pub message_id: MessageId,
    /// Set when this event originates from a sub-agent rather than the
    /// top-level conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    /// Set alongside `agent_id`: the tool call in the parent conversation
    /// that spawned this sub-agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<ToolCallId>,
    /// When the event was produced.
    pub timestamp: Timestamp,
}

impl EventMetadata {
    /// Build metadata for a top-level (non-sub-agent) event.
    #[must_use]
    pub fn new(conversation_id: ConversationId, message_id: MessageId) -> Self {
        Self {
            conversation_id,
            message_id,
            agent_id: None,
            tool_call_id: None,
            timestamp: wren_core::now(),
        }
    }

    /// Build metadata for an event re-emitted from a sub-agent, tagging it
    /// with the child's id and the parent tool call it was spawned from.
    #[must_use]
    pub fn for_sub_agent(
        conversation_id: ConversationId,
        message_id: MessageId,
        agent_id: AgentId,
        tool_call_id: ToolCallId,
    ) -> Self {
        Self {
            conversation_id,
            message_id,
            agent_id: Some(agent_id),
            tool_call_id: Some(tool_call_id),
            timestamp: wren_core::now(),
        }
    }
}

/// The full tagged union of events the orchestrator can emit.
///
/// Serializes with `type` as the discriminant and the rest of the payload
/// flattened alongside it, so a subscriber rendering a UI can match on
/// `"type"` without deserializing the whole enum up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A `send()` call began.
    MessageStarted {
        /// Shared event context.
        #[serde(flatten)]
        meta: EventMetadata,
        /// Tool names enabled for this turn.
        tool_names: Vec<String>,
        /// The raw text of the incoming user content.
        user_content: String,
    },
    /// An LLM call is about to be issued.
    LlmCallStarted {
        /// Shared event context.
        #[serde(flatten)]
        meta: EventMetadata,
        /// The model identifier being called.
        model: String,
    },
    /// An incremental content delta from a streaming LLM call.
    LlmChunk {
        /// Shared event context.
        #[serde(flatten)]
        meta: EventMetadata,
        /// The text fragment.
        delta: String,
        /// Whether this fragment is a model "reasoning" delta rather than
        /// ordinary assistant content.
        reasoning: bool,
    },
    /// An LLM call finished, streamed or not.
    LlmCallCompleted {
        /// Shared event context.
        #[serde(flatten)]
        meta: EventMetadata,
        /// Why generation stopped, as reported by the provider.
        finish_reason: String,
        /// Normalized token usage for this call.
        usage: Usage,
    },
    /// The model requested one or more tool calls.
    ToolCalls {
        /// Shared event context.
        #[serde(flatten)]
        meta: EventMetadata,
        /// The requested calls, in model-returned order.
        tool_calls: Vec<ToolCallSummary>,
    },
    /// One tool call finished executing.
    ToolResult {
        /// Shared event context.
        #[serde(flatten)]
        meta: EventMetadata,
        /// The outcome.
        result: ToolResultSummary,
    },
    /// The merged assistant message for one iteration was appended to memory.
    AssistantMessage {
        /// Shared event context.
        #[serde(flatten)]
        meta: EventMetadata,
        /// The assistant's text content, if any.
        content: Option<String>,
        /// Whether this message carried tool calls.
        had_tool_calls: bool,
    },
    /// A message was appended to the memory port.
    MemoryAppended {
        /// Shared event context.
        #[serde(flatten)]
        meta: EventMetadata,
        /// The role of the appended message.
        role: String,
    },
    /// A sub-agent session began.
    SubAgentStarted {
        /// Shared event context; `agent_id`/`tool_call_id` are always set.
        #[serde(flatten)]
        meta: EventMetadata,
        /// The agent template id that was delegated to.
        agent_template_id: String,
        /// The task description handed to the sub-agent.
        task: String,
    },
    /// A sub-agent's metrics snapshot changed.
    SubAgentMetrics {
        /// Shared event context; `agent_id`/`tool_call_id` are always set.
        #[serde(flatten)]
        meta: EventMetadata,
        /// The sub-agent's current totals.
        snapshot: MetricsSnapshot,
    },
    /// A sub-agent session finished.
    SubAgentCompleted {
        /// Shared event context; `agent_id`/`tool_call_id` are always set.
        #[serde(flatten)]
        meta: EventMetadata,
        /// Whether the delegated run succeeded.
        success: bool,
        /// Total wall-clock time of the sub-agent run.
        execution_time_ms: u64,
    },
    /// The `send()` call finished successfully.
    Done {
        /// Shared event context.
        #[serde(flatten)]
        meta: EventMetadata,
        /// Total wall-clock time of the call.
        response_time_ms: u64,
        /// Normalized usage accumulated over the whole call.
        usage: Usage,
    },
    /// The `send()` call terminated abnormally.
    Error {
        /// Shared event context.
        #[serde(flatten)]
        meta: EventMetadata,
        /// A short machine-matchable failure kind (e.g. `"aborted"`,
        /// `"iteration_limit"`).
        kind: String,
        /// A human-readable message.
        message: String,
    },
}

impl AgentEvent {
    /// The event's discriminant, matching its serialized `"type"` tag.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageStarted { .. } => "message_started",
            Self::LlmCallStarted { .. } => "llm_call_started",
            Self::LlmChunk { .. } => "llm_chunk",
            Self::LlmCallCompleted { .. } => "llm_call_completed",
            Self::ToolCalls { .. } => "tool_calls",
            Self::ToolResult { .. } => "tool_result",
            Self::AssistantMessage { .. } => "assistant_message",
            Self::MemoryAppended { .. } => "memory_appended",
            Self::SubAgentStarted { .. } => "sub_agent_started",
            Self::SubAgentMetrics { .. } => "sub_agent_metrics",
            Self::SubAgentCompleted { .. } => "sub_agent_completed",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    /// Shared context carried by every variant.
    #[must_use]
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            Self::MessageStarted { meta, .. }
            | Self::LlmCallStarted { meta, .. }
            | Self::LlmChunk { meta, .. }
            | Self::LlmCallCompleted { meta, .. }
            | Self::ToolCalls { meta, .. }
            | Self::ToolResult { meta, .. }
            | Self::AssistantMessage { meta, .. }
            | Self::MemoryAppended { meta, .. }
            | Self::SubAgentStarted { meta, .. }
            | Self::SubAgentMetrics { meta, .. }
            | Self::SubAgentCompleted { meta, .. }
            | Self::Done { meta, .. }
            | Self::Error { meta, .. } => meta,
        }
    }

    /// Serialize this event as one NDJSON line, wrapped in the versioned
    /// wire envelope (`{"v":1,"type":...,...}`).
    pub fn to_ndjson_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(&EventEnvelope::new(self))
    }
}

/// Versioned wire envelope for one [`AgentEvent`].
///
/// Flattens the event's own fields alongside a top-level `v` tag so NDJSON
/// consumers can branch on schema version before touching the payload.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope<'a> {
    /// Schema version of this envelope, see [`EVENT_SCHEMA_VERSION`].
    pub v: u32,
    /// The wrapped event.
    #[serde(flatten)]
    pub event: &'a AgentEvent,
}

impl<'a> EventEnvelope<'a> {
    /// Wrap `event` at the current [`EVENT_SCHEMA_VERSION`].
    #[must_use]
    pub fn new(event: &'a AgentEvent) -> Self {
        Self { v: EVENT_SCHEMA_VERSION, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_matches_serialized_tag() {
        let meta = EventMetadata::new(ConversationId::new(), MessageId::new());
        let event = AgentEvent::Done {
            meta,
            response_time_ms: 12,
            usage: Usage {
                prompt_tokens: 1,
                completion_tokens: 2,
                total_tokens: 3,
                reasoning_tokens: None,
                cost: None,
            },
        };
        assert_eq!(event.event_type(), "done");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "done");
    }

    #[test]
    fn sub_agent_metadata_carries_linkage() {
        let meta = EventMetadata::for_sub_agent(
            ConversationId::new(),
            MessageId::new(),
            AgentId::new(),
            ToolCallId::new(),
        );
        assert!(meta.agent_id.is_some());
        assert!(meta.tool_call_id.is_some());
    }

    #[test]
    fn ndjson_line_carries_the_schema_version_tag() {
        let meta = EventMetadata::new(ConversationId::new(), MessageId::new());
        let event = AgentEvent::Done {
            meta,
            response_time_ms: 12,
            usage: Usage {
                prompt_tokens: 1,
                completion_tokens: 2,
                total_tokens: 3,
                reasoning_tokens: None,
                cost: None,
            },
        };
        let line = event.to_ndjson_line().unwrap();
        assert!(!line.contains('\n'));
        let json: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["v"], 1);
        assert_eq!(json["type"], "done");
    }
}
