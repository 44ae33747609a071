//! The built-in tool contract and the port that executes them.
//!
//! Only the contract is specified here — concrete tool bodies (file I/O,
//! shell, web) are external collaborators that implement [`BuiltinTool`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use wren_approval::ApprovalRequest;
use wren_core::RiskLevel;
use wren_events::{AgentEvent, EventMetadata, ToolResultSummary};
use wren_llm::{LlmToolDefinition, ToolCall, ToolExecutionResult, ToolResultKind, ToolResultStatus};

use crate::context::ToolContext;
use crate::port::ToolPort;
use crate::truncate::truncate_json_result;

/// A built-in tool that executes directly in-process.
#[async_trait]
pub trait BuiltinTool: Send + Sync {
    /// Tool name. No colons — that namespace is reserved for MCP tools.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments object.
    fn input_schema(&self) -> Value;

    /// Risk level assigned to this tool, gating whether the approval hook
    /// is consulted before execution. Defaults to [`RiskLevel::Low`].
    fn risk_level(&self) -> RiskLevel {
        RiskLevel::Low
    }

    /// Validate `args` before execution without running the tool body.
    /// The default accepts any JSON object.
    fn validate(&self, args: &Value) -> Result<(), String> {
        if args.is_object() {
            Ok(())
        } else {
            Err("arguments must be a JSON object".to_string())
        }
    }

    /// Run the tool body, honoring `ctx.cancel`.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, String>;
}

/// Executes a batch of invocations against a registry of [`BuiltinTool`]s,
/// enforcing the approval hook, a `max_concurrent` in-flight bound, and
/// cancellation, then normalizing outputs to [`ToolExecutionResult`].
pub struct BuiltinToolPort {
    tools: HashMap<String, Arc<dyn BuiltinTool>>,
}

impl BuiltinToolPort {
    /// Build a port from an ordered set of tools.
    #[must_use]
    pub fn new(tools: Vec<Arc<dyn BuiltinTool>>) -> Self {
        Self {
            tools: tools.into_iter().map(|tool| (tool.name().to_string(), tool)).collect(),
        }
    }

    async fn execute_one(&self, index: usize, call: ToolCall, ctx: &ToolContext) -> (usize, ToolExecutionResult) {
        let Some(tool) = self.tools.get(&call.function.name) else {
            return (index, not_found(&call));
        };

        if ctx.cancel.is_cancelled() {
            return (index, aborted(&call));
        }

        let args: Value = match serde_json::from_str(&call.function.arguments) {
            Ok(value) => value,
            Err(error) => return (index, invalid_arguments(&call, &error.to_string())),
        };

        if let Err(reason) = tool.validate(&args) {
            return (index, invalid_arguments(&call, &reason));
        }

        let risk = tool.risk_level();
        let mut args = args;
        if risk.requires_approval() {
            let request = ApprovalRequest::new(
                wren_core::ToolCallId::from_string(call.id.clone()),
                ctx.conversation_id.clone(),
                call.function.name.clone(),
                args.clone(),
                risk,
                format!("agent requested {}", call.function.name),
            );
            match ctx.approval.consult(&request, &ctx.cancel).await {
                Ok(decision) if !decision.allows_execution() => {
                    let reason = decision.denial_reason().unwrap_or("denied").to_string();
                    return (index, denied(&call, &reason));
                }
                Ok(decision) => {
                    if let Some(new_args) = decision.edited_arguments() {
                        args = new_args.clone();
                    }
                }
                Err(error) => return (index, denied(&call, &error.to_string())),
            }
        }

        let start = Instant::now();
        let outcome = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => {
                debug!(tool = %call.function.name, "cancelled mid-execution");
                return (index, aborted(&call));
            }
            result = tool.execute(args, ctx) => result,
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(value) => ToolExecutionResult {
                id: call.id.clone(),
                name: call.function.name.clone(),
                status: ToolResultStatus::Success,
                result_type: if value.is_string() { ToolResultKind::Text } else { ToolResultKind::Json },
                result: truncate_json_result(value),
                duration_ms,
                metadata: serde_json::Map::new(),
            },
            Err(message) => {
                warn!(tool = %call.function.name, error = %message, "tool execution failed");
                ToolExecutionResult {
                    id: call.id.clone(),
                    name: call.function.name.clone(),
                    status: ToolResultStatus::Error,
                    result_type: ToolResultKind::Text,
                    result: Value::String(message),
                    duration_ms,
                    metadata: serde_json::Map::new(),
                }
            }
        };

        ctx.event_bus.publish(AgentEvent::ToolResult {
            meta: EventMetadata::new(ctx.conversation_id.clone(), ctx.message_id.clone()),
            result: ToolResultSummary {
                id: wren_core::ToolCallId::from_string(result.id.clone()),
                name: result.name.clone(),
                status: match result.status {
                    ToolResultStatus::Success => wren_events::ToolResultStatus::Success,
                    ToolResultStatus::Error => wren_events::ToolResultStatus::Error,
                },
                duration_ms: result.duration_ms,
                result: result.result.clone(),
            },
        });

        (index, result)
    }
}

#[async_trait]
impl ToolPort for BuiltinToolPort {
    async fn tool_definitions(&self, enabled_tool_names: &[String]) -> Vec<LlmToolDefinition> {
        enabled_tool_names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| LlmToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    async fn execute_tool_calls(
        &self,
        invocations: &[ToolCall],
        ctx: &ToolContext,
        max_concurrent: usize,
    ) -> Vec<ToolExecutionResult> {
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
        let mut in_flight = FuturesUnordered::new();

        for (index, call) in invocations.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            in_flight.push(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, aborted(&call));
                };
                self.execute_one(index, call, ctx).await
            });
        }

        let mut indexed = Vec::with_capacity(invocations.len());
        while let Some(result) = in_flight.next().await {
            indexed.push(result);
        }
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }
}

fn not_found(call: &ToolCall) -> ToolExecutionResult {
    ToolExecutionResult {
        id: call.id.clone(),
        name: call.function.name.clone(),
        status: ToolResultStatus::Error,
        result_type: ToolResultKind::Text,
        result: Value::String(format!("No tool found for {}", call.function.name)),
        duration_ms: 0,
        metadata: serde_json::Map::new(),
    }
}

fn aborted(call: &ToolCall) -> ToolExecutionResult {
    ToolExecutionResult {
        id: call.id.clone(),
        name: call.function.name.clone(),
        status: ToolResultStatus::Error,
        result_type: ToolResultKind::Text,
        result: Value::String("aborted".to_string()),
        duration_ms: 0,
        metadata: serde_json::Map::new(),
    }
}

fn invalid_arguments(call: &ToolCall, reason: &str) -> ToolExecutionResult {
    ToolExecutionResult {
        id: call.id.clone(),
        name: call.function.name.clone(),
        status: ToolResultStatus::Error,
        result_type: ToolResultKind::Text,
        result: Value::String(format!("invalid arguments: {reason}")),
        duration_ms: 0,
        metadata: serde_json::Map::new(),
    }
}

fn denied(call: &ToolCall, reason: &str) -> ToolExecutionResult {
    ToolExecutionResult {
        id: call.id.clone(),
        name: call.function.name.clone(),
        status: ToolResultStatus::Error,
        result_type: ToolResultKind::Text,
        result: Value::String(format!("denied: {reason}")),
        duration_ms: 0,
        metadata: serde_json::Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wren_approval::{AlwaysAllow, AlwaysDeny, ApprovalManager};
    use wren_core::{CancelToken, ConversationId, MessageId};
    use wren_events::EventBus;
    use wren_llm::FunctionCall;

    struct EchoTool;

    #[async_trait]
    impl BuiltinTool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its input"
        }
        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object"})
        }
        async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<Value, String> {
            Ok(args)
        }
    }

    struct DangerousTool;

    #[async_trait]
    impl BuiltinTool for DangerousTool {
        fn name(&self) -> &str {
            "delete_everything"
        }
        fn description(&self) -> &str {
            "destructive"
        }
        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object"})
        }
        fn risk_level(&self) -> RiskLevel {
            RiskLevel::Critical
        }
        async fn execute(&self, _args: Value, _ctx: &ToolContext) -> Result<Value, String> {
            Ok(Value::String("deleted".to_string()))
        }
    }

    fn context_with(approval: Arc<ApprovalManager>) -> ToolContext {
        ToolContext::new(
            Arc::new(EventBus::new()),
            ConversationId::new(),
            MessageId::new(),
            approval,
            CancelToken::new(),
            std::env::temp_dir(),
        )
    }

    fn call(name: &str, args: &str) -> ToolCall {
        ToolCall {
            id: "1".into(),
            function: FunctionCall {
                name: name.into(),
                arguments: args.into(),
            },
        }
    }

    #[tokio::test]
    async fn low_risk_tool_executes_without_approval() {
        let port = BuiltinToolPort::new(vec![Arc::new(EchoTool)]);
        let ctx = context_with(Arc::new(ApprovalManager::new(Arc::new(AlwaysDeny::new("never")))));
        let results = port
            .execute_tool_calls(&[call("echo", r#"{"x":1}"#)], &ctx, 3)
            .await;
        assert_eq!(results[0].status, ToolResultStatus::Success);
    }

    #[tokio::test]
    async fn critical_risk_tool_is_denied_by_the_approval_hook() {
        let port = BuiltinToolPort::new(vec![Arc::new(DangerousTool)]);
        let ctx = context_with(Arc::new(ApprovalManager::new(Arc::new(AlwaysDeny::new("too risky")))));
        let results = port
            .execute_tool_calls(&[call("delete_everything", "{}")], &ctx, 3)
            .await;
        assert_eq!(results[0].status, ToolResultStatus::Error);
        assert!(results[0].result.as_str().unwrap().contains("too risky"));
    }

    #[tokio::test]
    async fn critical_risk_tool_runs_when_approved() {
        let port = BuiltinToolPort::new(vec![Arc::new(DangerousTool)]);
        let ctx = context_with(Arc::new(ApprovalManager::new(Arc::new(AlwaysAllow))));
        let results = port
            .execute_tool_calls(&[call("delete_everything", "{}")], &ctx, 3)
            .await;
        assert_eq!(results[0].status, ToolResultStatus::Success);
    }

    #[tokio::test]
    async fn malformed_json_arguments_fail_validation_without_running_the_body() {
        let port = BuiltinToolPort::new(vec![Arc::new(EchoTool)]);
        let ctx = context_with(Arc::new(ApprovalManager::new(Arc::new(AlwaysAllow))));
        let results = port.execute_tool_calls(&[call("echo", "not json")], &ctx, 3).await;
        assert_eq!(results[0].status, ToolResultStatus::Error);
        assert!(results[0].result.as_str().unwrap().contains("invalid arguments"));
    }

    #[tokio::test]
    async fn batch_preserves_original_order_regardless_of_completion_order() {
        let port = BuiltinToolPort::new(vec![Arc::new(EchoTool)]);
        let ctx = context_with(Arc::new(ApprovalManager::new(Arc::new(AlwaysAllow))));
        let calls = vec![
            call("echo", r#"{"n":1}"#),
            call("echo", r#"{"n":2}"#),
            call("echo", r#"{"n":3}"#),
        ];
        let results = port.execute_tool_calls(&calls, &ctx, 2).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].result, serde_json::json!({"n": 1}));
        assert_eq!(results[1].result, serde_json::json!({"n": 2}));
        assert_eq!(results[2].result, serde_json::json!({"n": 3}));
    }

    struct SleepTool {
        name: &'static str,
        millis: u64,
    }

    #[async_trait]
    impl BuiltinTool for SleepTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "sleeps then echoes its id"
        }
        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object"})
        }
        async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<Value, String> {
            tokio::time::sleep(std::time::Duration::from_millis(self.millis)).await;
            Ok(args)
        }
    }

    #[tokio::test]
    async fn tool_result_events_fire_in_completion_order_not_call_order() {
        let port = BuiltinToolPort::new(vec![
            Arc::new(SleepTool { name: "sleep_slow", millis: 50 }),
            Arc::new(SleepTool { name: "sleep_fast", millis: 5 }),
        ]);
        let ctx = context_with(Arc::new(ApprovalManager::new(Arc::new(AlwaysAllow))));
        let mut receiver = ctx.event_bus.subscribe();

        let mut slow = call("sleep_slow", "{}");
        slow.id = "slow".into();
        let mut fast = call("sleep_fast", "{}");
        fast.id = "fast".into();

        let results = port.execute_tool_calls(&[slow, fast], &ctx, 2).await;
        // Final results preserve call order (memory append order)...
        assert_eq!(results[0].id, "slow");
        assert_eq!(results[1].id, "fast");

        // ...but the fast call's event was published first, since it finished first.
        let first = receiver.recv().await.unwrap();
        let AgentEvent::ToolResult { result, .. } = first.as_ref() else {
            panic!("expected a tool_result event")
        };
        assert_eq!(result.id.as_str(), "fast");
    }
}
