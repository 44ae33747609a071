//! Provider-agnostic message and completion types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wren_core::{MessageId, Timestamp};

/// Who produced a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// The system prompt.
    System,
    /// The human caller.
    User,
    /// The model.
    Assistant,
    /// A tool execution result fed back to the model.
    Tool,
}

/// One image attachment carried in a [`ContentPart::Image`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePart {
    /// MIME type, e.g. `"image/png"`.
    pub mime: String,
    /// Base64-encoded image bytes.
    pub base64: String,
    /// Optional human-readable alt text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// Optional display name (e.g. original filename).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One element of a structured, multimodal message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text itself.
        text: String,
    },
    /// An inlined image.
    Image {
        /// The image payload.
        #[serde(flatten)]
        image: ImagePart,
    },
}

/// The body of a [`Message`]: either a plain string, or an ordered sequence
/// of parts for multimodal turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content.
    Text(String),
    /// Structured, possibly multimodal content.
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Collapse to a single string for providers/roles that don't accept
    /// structured content: text parts are concatenated, image parts are
    /// dropped.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// A tool invocation requested by the model.
///
/// `arguments` is kept as a JSON string (not a parsed `Value`) because
/// providers stream it incrementally as raw text fragments that are only
/// guaranteed to parse once the call is complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Id correlating this call with its eventual result.
    pub id: String,
    /// The requested function, as `{name, arguments}`.
    pub function: FunctionCall,
}

/// The `function` half of a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// The tool name. May be namespaced as `"server:tool"`.
    pub name: String,
    /// Raw JSON-string arguments, as produced by the model.
    pub arguments: String,
}

impl ToolCall {
    /// Split a namespaced tool name (`"server:tool"`) into its server and
    /// tool components. Returns `(None, name)` when there is no namespace.
    #[must_use]
    pub fn parse_name(&self) -> (Option<&str>, &str) {
        match self.function.name.split_once(':') {
            Some((server, tool)) => (Some(server), tool),
            None => (None, self.function.name.as_str()),
        }
    }

    /// Parse `arguments` as JSON. Fails only if the model produced
    /// malformed JSON.
    pub fn parsed_arguments(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.function.arguments)
    }
}

/// `ToolExecutionResult.status`, normalized at the tool layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultStatus {
    /// The tool ran to completion.
    Success,
    /// The tool failed; the content still flows back to the model.
    Error,
}

/// `ToolExecutionResult.type`: whether `result` should be read as a plain
/// string or as structured JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultKind {
    /// `result` is a plain string.
    Text,
    /// `result` is a JSON value.
    Json,
}

/// The normalized outcome of executing one tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    /// The call this result answers.
    pub id: String,
    /// The tool name that was invoked.
    pub name: String,
    /// Whether it succeeded.
    pub status: ToolResultStatus,
    /// Whether `result` is text or JSON.
    pub result_type: ToolResultKind,
    /// The result payload.
    pub result: Value,
    /// Wall-clock execution time, in milliseconds.
    pub duration_ms: u64,
    /// Tool-specific metadata (file path, exit code, line numbers, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, Value>,
}

/// One entry in a conversation's ordered message history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Stable id for this entry.
    pub id: MessageId,
    /// Who produced it.
    pub role: MessageRole,
    /// The message body.
    pub content: MessageContent,
    /// Tool calls requested by this message. Only set for `role: assistant`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// The call this message answers. Only set for `role: tool`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// The tool name that produced this message. Only set for `role: tool`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// When this entry was appended.
    pub timestamp: Timestamp,
    /// Set when this message was produced inside a sub-agent session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_agent_id: Option<String>,
}

impl Message {
    /// Build a plain-text user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageContent::Text(text.into()))
    }

    /// Build a plain-text system message.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, MessageContent::Text(text.into()))
    }

    /// Build an assistant message carrying only text (no tool calls).
    #[must_use]
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageContent::Text(text.into()))
    }

    /// Build an assistant message carrying tool calls (content may be empty).
    #[must_use]
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        let mut message = Self::new(
            MessageRole::Assistant,
            MessageContent::Text(content.unwrap_or_default()),
        );
        message.tool_calls = Some(tool_calls);
        message
    }

    /// Build a tool-result message answering `tool_call_id`.
    #[must_use]
    pub fn tool_result(tool_call_id: impl Into<String>, name: impl Into<String>, content: Value) -> Self {
        let mut message = Self::new(MessageRole::Tool, MessageContent::Text(stringify(&content)));
        message.tool_call_id = Some(tool_call_id.into());
        message.name = Some(name.into());
        message
    }

    fn new(role: MessageRole, content: MessageContent) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
            tool_calls: None,
            tool_call_id: None,
            name: None,
            timestamp: wren_core::now(),
            sub_agent_id: None,
        }
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A tool's declared shape, as presented to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmToolDefinition {
    /// The tool name the model should emit in a [`ToolCall`].
    pub name: String,
    /// A natural-language description shown to the model.
    pub description: String,
    /// JSON Schema for the tool's arguments object.
    pub input_schema: Value,
}

/// Normalized token/cost usage, reconciled across provider-specific field
/// names (`input_tokens`/`output_tokens` aliases, computed `total_tokens`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Input tokens.
    pub prompt_tokens: u64,
    /// Output tokens.
    pub completion_tokens: u64,
    /// `prompt_tokens + completion_tokens`.
    pub total_tokens: u64,
    /// Reasoning tokens, if the provider reports them separately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u64>,
    /// Tokens served from a provider-side cache, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u64>,
    /// Estimated dollar cost, if the provider reports pricing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl Usage {
    /// Build from the two universally-present fields, computing `total`.
    #[must_use]
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            reasoning_tokens: None,
            cached_tokens: None,
            cost: None,
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model produced a complete turn with no further tool calls.
    EndTurn,
    /// The model requested one or more tool calls.
    ToolUse,
    /// Generation was cut off by `max_tokens`.
    MaxTokens,
    /// Generation was cut off by a stop sequence or content filter.
    StopSequence,
}

/// A fully assembled (non-streaming, or stream-aggregated) completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The assistant message produced, including any tool calls.
    pub message: Message,
    /// Convenience flag mirroring `message.tool_calls.is_some()`.
    pub has_tool_calls: bool,
    /// Why generation stopped.
    pub stop_reason: StopReason,
    /// Normalized usage for this call.
    pub usage: Usage,
}

/// Declared capacity limits for a [`Model`], where the provider reports them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ModelLimits {
    /// Total context window, in tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<usize>,
    /// Maximum tokens the model will generate in one completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output: Option<usize>,
}

/// One model a provider can be pointed at, as returned by
/// [`crate::provider::LlmProvider::get_models`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// The provider-specific model identifier (what `model()` returns when
    /// configured with it).
    pub id: String,
    /// A human-readable display name, falling back to `id` when the
    /// provider doesn't report one separately.
    pub name: String,
    /// Capacity limits, where the provider advertises them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<ModelLimits>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_name_splits_server_namespace() {
        let call = ToolCall {
            id: "1".into(),
            function: FunctionCall {
                name: "fs:read_file".into(),
                arguments: "{}".into(),
            },
        };
        assert_eq!(call.parse_name(), (Some("fs"), "read_file"));
    }

    #[test]
    fn tool_call_without_namespace_has_no_server() {
        let call = ToolCall {
            id: "1".into(),
            function: FunctionCall {
                name: "assign_task".into(),
                arguments: "{}".into(),
            },
        };
        assert_eq!(call.parse_name(), (None, "assign_task"));
    }

    #[test]
    fn message_content_collapses_parts_to_text() {
        let content = MessageContent::Parts(vec![
            ContentPart::Text { text: "a".into() },
            ContentPart::Image {
                image: ImagePart {
                    mime: "image/png".into(),
                    base64: "xyz".into(),
                    alt_text: None,
                    name: None,
                },
            },
            ContentPart::Text { text: "b".into() },
        ]);
        assert_eq!(content.as_text(), "ab");
    }

    #[test]
    fn usage_computes_total() {
        let usage = Usage::new(10, 5);
        assert_eq!(usage.total_tokens, 15);
    }
}
