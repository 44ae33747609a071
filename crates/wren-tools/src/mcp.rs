//! The MCP bridge port.
//!
//! Tool discovery and invocation mechanics for the Model Context Protocol
//! are an external collaborator's concern; this crate presents only the
//! contract a bridge must satisfy to plug into the [`ToolPort`] dispatch
//! chain, namespacing every tool it owns as `"<server>:<tool>"`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use wren_llm::{LlmToolDefinition, ToolCall, ToolExecutionResult, ToolResultKind, ToolResultStatus};

use crate::context::ToolContext;
use crate::port::ToolPort;

/// One connected MCP server: its declared tools and a way to invoke them.
#[async_trait]
pub trait McpServerConnection: Send + Sync {
    /// The server's name, used as the `"<server>:"` namespace prefix.
    fn server_name(&self) -> &str;

    /// Tools this server currently exposes, unprefixed.
    async fn list_tools(&self) -> Vec<LlmToolDefinition>;

    /// Invoke `tool` (unprefixed) with `arguments`, honoring `ctx.cancel`.
    async fn call_tool(&self, tool: &str, arguments: serde_json::Value, ctx: &ToolContext) -> Result<serde_json::Value, String>;
}

/// Bridges one or more [`McpServerConnection`]s into the [`ToolPort`]
/// contract, namespacing each server's tools as `"server:tool"`.
pub struct McpBridgePort {
    servers: Vec<Arc<dyn McpServerConnection>>,
}

impl McpBridgePort {
    /// Build a bridge over a set of already-connected servers.
    #[must_use]
    pub fn new(servers: Vec<Arc<dyn McpServerConnection>>) -> Self {
        Self { servers }
    }

    fn split_name<'a>(&self, tool_name: &'a str) -> Option<(&'a str, &'a str)> {
        tool_name.split_once(':')
    }
}

#[async_trait]
impl ToolPort for McpBridgePort {
    async fn tool_definitions(&self, enabled_tool_names: &[String]) -> Vec<LlmToolDefinition> {
        let mut defs = Vec::new();
        for server in &self.servers {
            for def in server.list_tools().await {
                let namespaced = format!("{}:{}", server.server_name(), def.name);
                if enabled_tool_names.iter().any(|name| name == &namespaced) {
                    defs.push(LlmToolDefinition {
                        name: namespaced,
                        description: def.description,
                        input_schema: def.input_schema,
                    });
                }
            }
        }
        defs
    }

    async fn execute_tool_calls(
        &self,
        invocations: &[ToolCall],
        ctx: &ToolContext,
        _max_concurrent: usize,
    ) -> Vec<ToolExecutionResult> {
        let servers_by_name: HashMap<&str, &Arc<dyn McpServerConnection>> = self
            .servers
            .iter()
            .map(|server| (server.server_name(), server))
            .collect();

        let mut results = Vec::with_capacity(invocations.len());
        for call in invocations {
            let Some((server_name, tool)) = self.split_name(&call.function.name) else {
                results.push(unowned(call));
                continue;
            };
            let Some(server) = servers_by_name.get(server_name) else {
                results.push(unowned(call));
                continue;
            };
            let arguments: serde_json::Value = serde_json::from_str(&call.function.arguments)
                .unwrap_or(serde_json::Value::Null);
            let outcome = server.call_tool(tool, arguments, ctx).await;
            results.push(match outcome {
                Ok(value) => ToolExecutionResult {
                    id: call.id.clone(),
                    name: call.function.name.clone(),
                    status: ToolResultStatus::Success,
                    result_type: if value.is_string() { ToolResultKind::Text } else { ToolResultKind::Json },
                    result: value,
                    duration_ms: 0,
                    metadata: serde_json::Map::new(),
                },
                Err(message) => ToolExecutionResult {
                    id: call.id.clone(),
                    name: call.function.name.clone(),
                    status: ToolResultStatus::Error,
                    result_type: ToolResultKind::Text,
                    result: serde_json::Value::String(message),
                    duration_ms: 0,
                    metadata: serde_json::Map::new(),
                },
            });
        }
        results
    }
}

fn unowned(call: &ToolCall) -> ToolExecutionResult {
    ToolExecutionResult {
        id: call.id.clone(),
        name: call.function.name.clone(),
        status: ToolResultStatus::Error,
        result_type: ToolResultKind::Text,
        result: serde_json::Value::String(format!("No tool found for {}", call.function.name)),
        duration_ms: 0,
        metadata: serde_json::Map::new(),
    }
}
