//! The Tool Port contract and its data-driven composite dispatcher.

use async_trait::async_trait;
use serde_json::Value;
use wren_events::{AgentEvent, EventMetadata, ToolResultSummary};
use wren_llm::{LlmToolDefinition, ToolCall, ToolExecutionResult, ToolResultKind, ToolResultStatus};

use crate::context::ToolContext;

/// One source of tools: a set of built-in functions, an MCP server bridge,
/// or the delegation tool. Implementors only ever see the slice of an
/// invocation batch that [`CompositeToolPort`] has routed to them.
#[async_trait]
pub trait ToolPort: Send + Sync {
    /// The LLM-visible definitions this port owns, restricted to the names
    /// present in `enabled_tool_names`.
    async fn tool_definitions(&self, enabled_tool_names: &[String]) -> Vec<LlmToolDefinition>;

    /// Execute this port's share of one invocation batch, honoring
    /// `max_concurrent` in-flight executions and `ctx.cancel`.
    async fn execute_tool_calls(
        &self,
        invocations: &[ToolCall],
        ctx: &ToolContext,
        max_concurrent: usize,
    ) -> Vec<ToolExecutionResult>;
}

/// Routes each invocation in a batch to whichever child port owns its tool
/// name, querying `tool_definitions` to discover ownership and producing an
/// immediate `"No tool found for <name>"` error result for any invocation
/// no child claims.
pub struct CompositeToolPort {
    children: Vec<std::sync::Arc<dyn ToolPort>>,
}

impl CompositeToolPort {
    /// Build a composite over an ordered list of child ports. Order only
    /// matters if two children somehow claim the same name, in which case
    /// the first child wins.
    #[must_use]
    pub fn new(children: Vec<std::sync::Arc<dyn ToolPort>>) -> Self {
        Self { children }
    }
}

#[async_trait]
impl ToolPort for CompositeToolPort {
    async fn tool_definitions(&self, enabled_tool_names: &[String]) -> Vec<LlmToolDefinition> {
        let mut seen = std::collections::HashSet::new();
        let mut defs = Vec::new();
        for child in &self.children {
            for def in child.tool_definitions(enabled_tool_names).await {
                if seen.insert(def.name.clone()) {
                    defs.push(def);
                }
            }
        }
        defs
    }

    async fn execute_tool_calls(
        &self,
        invocations: &[ToolCall],
        ctx: &ToolContext,
        max_concurrent: usize,
    ) -> Vec<ToolExecutionResult> {
        let enabled_names: Vec<String> = invocations.iter().map(|c| c.function.name.clone()).collect();

        let mut owner_of: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        for (child_idx, child) in self.children.iter().enumerate() {
            for def in child.tool_definitions(&enabled_names).await {
                owner_of.entry(def.name).or_insert(child_idx);
            }
        }

        let mut partitions: Vec<Vec<(usize, ToolCall)>> = self.children.iter().map(|_| Vec::new()).collect();
        let mut indexed_results: Vec<(usize, ToolExecutionResult)> = Vec::with_capacity(invocations.len());

        for (idx, call) in invocations.iter().cloned().enumerate() {
            match owner_of.get(&call.function.name) {
                Some(&owner_idx) => partitions[owner_idx].push((idx, call)),
                None => {
                    let result = not_found_result(&call);
                    ctx.event_bus.publish(AgentEvent::ToolResult {
                        meta: EventMetadata::new(ctx.conversation_id.clone(), ctx.message_id.clone()),
                        result: ToolResultSummary {
                            id: wren_core::ToolCallId::from_string(result.id.clone()),
                            name: result.name.clone(),
                            status: wren_events::ToolResultStatus::Error,
                            duration_ms: result.duration_ms,
                            result: result.result.clone(),
                        },
                    });
                    indexed_results.push((idx, result));
                }
            }
        }

        for (child_idx, partition) in partitions.into_iter().enumerate() {
            if partition.is_empty() {
                continue;
            }
            let (indices, calls): (Vec<usize>, Vec<ToolCall>) = partition.into_iter().unzip();
            let child_results = self.children[child_idx]
                .execute_tool_calls(&calls, ctx, max_concurrent)
                .await;
            indexed_results.extend(indices.into_iter().zip(child_results));
        }

        indexed_results.sort_by_key(|(idx, _)| *idx);
        indexed_results.into_iter().map(|(_, result)| result).collect()
    }
}

fn not_found_result(call: &ToolCall) -> ToolExecutionResult {
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
