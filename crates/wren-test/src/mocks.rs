//! Mock implementations for testing: a scriptable [`LlmProvider`] and a
//! scriptable [`BuiltinTool`].

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use serde_json::Value;
use wren_core::{CancelToken, RiskLevel};
use wren_llm::{
    FunctionCall, LlmError, LlmProvider, LlmResponse, LlmResult, LlmToolDefinition, Message,
    SseEvent, StopReason, StreamBox, ToolCall, Usage,
};
use wren_tools::{BuiltinTool, ToolContext};

/// One call captured by [`MockLlmProvider`], for asserting on what the
/// orchestrator actually sent.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The message history as of this call.
    pub messages: Vec<Message>,
    /// The tool definitions offered to the model.
    pub tools: Vec<LlmToolDefinition>,
    /// The rendered system prompt.
    pub system: String,
}

/// One queued outcome for the next `stream`/`complete` call on a
/// [`MockLlmProvider`].
enum ScriptedTurn {
    Events(Vec<SseEvent>),
    Failure(LlmError),
}

/// A scriptable [`LlmProvider`] backed by a queue of canned responses.
///
/// Each call to `stream` or `complete` pops the next queued turn. Once the
/// queue is empty, calls fall back to a single `"mock response"` text turn
/// rather than panicking, so tests that only care about the first N turns
/// don't need to script every iteration of a loop.
#[derive(Clone)]
pub struct MockLlmProvider {
    name: String,
    model: String,
    max_context_length: usize,
    script: Arc<Mutex<VecDeque<ScriptedTurn>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockLlmProvider {
    /// Build a provider reporting `model`, with an empty script.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            model: model.into(),
            max_context_length: 128_000,
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Override the declared context window.
    #[must_use]
    pub fn with_context_window(mut self, tokens: usize) -> Self {
        self.max_context_length = tokens;
        self
    }

    /// Queue a plain text turn ending the model's run.
    #[must_use]
    pub fn queue_text(self, text: impl Into<String>) -> Self {
        self.queue_turn(ScriptedTurn::Events(vec![
            SseEvent::ContentDelta(text.into()),
            SseEvent::StreamFinish {
                finish_reason: Some("stop".to_string()),
                usage: Some(Usage::new(10, 5)),
            },
        ]))
    }

    /// Queue a single tool-call turn.
    #[must_use]
    pub fn queue_tool_call(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        self.queue_turn(ScriptedTurn::Events(vec![
            SseEvent::ToolCallDelta {
                index: 0,
                id: Some(id.into()),
                name: Some(name.into()),
                arguments_so_far: arguments.into(),
            },
            SseEvent::StreamFinish {
                finish_reason: Some("tool_calls".to_string()),
                usage: Some(Usage::new(10, 5)),
            },
        ]))
    }

    /// Queue a turn built from raw [`SseEvent`]s, for tests that need
    /// finer-grained control than `queue_text`/`queue_tool_call` allow.
    #[must_use]
    pub fn queue_events(self, events: Vec<SseEvent>) -> Self {
        self.queue_turn(ScriptedTurn::Events(events))
    }

    /// Queue a failing turn.
    #[must_use]
    pub fn queue_error(self, error: LlmError) -> Self {
        self.queue_turn(ScriptedTurn::Failure(error))
    }

    fn queue_turn(self, turn: ScriptedTurn) -> Self {
        if let Ok(mut guard) = self.script.lock() {
            guard.push_back(turn);
        }
        self
    }

    /// Every call made against this provider so far, in order.
    #[must_use]
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// How many calls have been made against this provider so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|g| g.len()).unwrap_or(0)
    }

    fn record_call(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(RecordedCall {
                messages: messages.to_vec(),
                tools: tools.to_vec(),
                system: system.to_string(),
            });
        }
    }

    fn next_turn(&self) -> ScriptedTurn {
        self.script
            .lock()
            .ok()
            .and_then(|mut g| g.pop_front())
            .unwrap_or_else(|| {
                ScriptedTurn::Events(vec![
                    SseEvent::ContentDelta("mock response".to_string()),
                    SseEvent::StreamFinish {
                        finish_reason: Some("stop".to_string()),
                        usage: Some(Usage::new(1, 1)),
                    },
                ])
            })
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn stream(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
        cancel: &CancelToken,
    ) -> LlmResult<StreamBox> {
        self.record_call(messages, tools, system);
        if cancel.is_cancelled() {
            return Err(wren_core::Aborted.into());
        }
        match self.next_turn() {
            ScriptedTurn::Events(events) => Ok(Box::pin(stream::iter(events.into_iter().map(Ok)))),
            ScriptedTurn::Failure(error) => Err(error),
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
        cancel: &CancelToken,
    ) -> LlmResult<LlmResponse> {
        self.record_call(messages, tools, system);
        if cancel.is_cancelled() {
            return Err(wren_core::Aborted.into());
        }
        match self.next_turn() {
            ScriptedTurn::Events(events) => Ok(assemble_response(events)),
            ScriptedTurn::Failure(error) => Err(error),
        }
    }

    fn max_context_length(&self) -> usize {
        self.max_context_length
    }
}

fn assemble_response(events: Vec<SseEvent>) -> LlmResponse {
    let mut content = String::new();
    let mut tool_calls: BTreeMap<usize, (Option<String>, Option<String>, String)> = BTreeMap::new();
    let mut finish_reason = None;
    let mut usage = Usage::default();

    for event in events {
        match event {
            SseEvent::ContentDelta(text) => content.push_str(&text),
            SseEvent::ReasoningDelta(_) => {}
            SseEvent::ToolCallDelta {
                index,
                id,
                name,
                arguments_so_far,
            } => {
                tool_calls.insert(index, (id, name, arguments_so_far));
            }
            SseEvent::StreamFinish {
                finish_reason: reason,
                usage: call_usage,
            } => {
                finish_reason = reason;
                if let Some(call_usage) = call_usage {
                    usage = call_usage;
                }
            }
        }
    }

    let calls: Vec<ToolCall> = tool_calls
        .into_values()
        .filter_map(|(id, name, arguments)| {
            Some(ToolCall {
                id: id?,
                function: FunctionCall { name: name?, arguments },
            })
        })
        .collect();

    let stop_reason = match finish_reason.as_deref() {
        Some("tool_calls") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        Some("stop_sequence") => StopReason::StopSequence,
        _ if !calls.is_empty() => StopReason::ToolUse,
        _ => StopReason::EndTurn,
    };

    let message = if calls.is_empty() {
        Message::assistant_text(content)
    } else {
        Message::assistant_tool_calls(Some(content), calls.clone())
    };

    LlmResponse {
        has_tool_calls: !calls.is_empty(),
        message,
        stop_reason,
        usage,
    }
}

/// A scriptable [`BuiltinTool`] backed by a queue of canned results.
///
/// Falls back to `Ok({"ok": true})` once the queue is empty.
#[derive(Clone)]
pub struct ScriptedTool {
    name: String,
    description: String,
    schema: Value,
    risk: RiskLevel,
    responses: Arc<Mutex<VecDeque<Result<Value, String>>>>,
    calls: Arc<Mutex<Vec<Value>>>,
}

impl ScriptedTool {
    /// Build a tool named `name` with no queued responses.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "a scripted test tool".to_string(),
            schema: serde_json::json!({"type": "object"}),
            risk: RiskLevel::Low,
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Override the description shown to the model.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Override the declared risk level (gating the approval hook).
    #[must_use]
    pub fn with_risk_level(mut self, risk: RiskLevel) -> Self {
        self.risk = risk;
        self
    }

    /// Queue a successful result.
    #[must_use]
    pub fn queue_success(self, value: Value) -> Self {
        if let Ok(mut guard) = self.responses.lock() {
            guard.push_back(Ok(value));
        }
        self
    }

    /// Queue a failing result.
    #[must_use]
    pub fn queue_failure(self, message: impl Into<String>) -> Self {
        if let Ok(mut guard) = self.responses.lock() {
            guard.push_back(Err(message.into()));
        }
        self
    }

    /// Every argument payload this tool was invoked with, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Value> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BuiltinTool for ScriptedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }

    fn risk_level(&self) -> RiskLevel {
        self.risk
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<Value, String> {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(args);
        }
        let next = self.responses.lock().ok().and_then(|mut g| g.pop_front());
        next.unwrap_or_else(|| Ok(serde_json::json!({"ok": true})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wren_core::ConversationId;
    use wren_core::MessageId as WrenMessageId;

    #[tokio::test]
    async fn queued_text_turn_streams_a_content_delta_then_finishes() {
        let provider = MockLlmProvider::new("test-model").queue_text("hello");
        let cancel = CancelToken::new();
        let mut stream = provider.stream(&[], &[], "", &cancel).await.unwrap();

        let mut events = Vec::new();
        while let Some(event) = futures::StreamExt::next(&mut stream).await {
            events.push(event.unwrap());
        }
        assert_eq!(events, vec![
            SseEvent::ContentDelta("hello".to_string()),
            SseEvent::StreamFinish {
                finish_reason: Some("stop".to_string()),
                usage: Some(Usage::new(10, 5)),
            },
        ]);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_script_falls_back_to_a_default_turn_instead_of_panicking() {
        let provider = MockLlmProvider::new("test-model");
        let cancel = CancelToken::new();
        let response = provider.complete(&[], &[], "", &cancel).await.unwrap();
        assert_eq!(response.message.content.as_text(), "mock response");
    }

    #[tokio::test]
    async fn queued_tool_call_completes_with_a_single_assembled_call() {
        let provider = MockLlmProvider::new("test-model").queue_tool_call("call_1", "read_file", r#"{"path":"a"}"#);
        let cancel = CancelToken::new();
        let response = provider.complete(&[], &[], "", &cancel).await.unwrap();
        assert!(response.has_tool_calls);
        let calls = response.message.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "read_file");
    }

    #[tokio::test]
    async fn cancellation_is_honored_before_consulting_the_script() {
        let provider = MockLlmProvider::new("test-model").queue_text("should not be reached");
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = provider.complete(&[], &[], "", &cancel).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn scripted_tool_returns_queued_results_in_order() {
        let tool = ScriptedTool::new("echo")
            .queue_success(serde_json::json!({"n": 1}))
            .queue_failure("boom");
        let ctx = ToolContext::new(
            Arc::new(wren_events::EventBus::new()),
            ConversationId::new(),
            WrenMessageId::new(),
            Arc::new(wren_approval::ApprovalManager::new(Arc::new(wren_approval::AlwaysAllow))),
            CancelToken::new(),
            std::env::temp_dir(),
        );

        let first = tool.execute(serde_json::json!({}), &ctx).await;
        assert_eq!(first.unwrap(), serde_json::json!({"n": 1}));

        let second = tool.execute(serde_json::json!({}), &ctx).await;
        assert_eq!(second.unwrap_err(), "boom");

        assert_eq!(tool.calls().len(), 2);
    }
}
