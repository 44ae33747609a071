//! The `assign_task`/`task_output` delegation tools and the spawner trait
//! that decouples this crate from the orchestrator that implements it.
//!
//! `wren-tools` defines [`SubAgentSpawner`]; `wren-runtime` implements it.
//! This avoids a circular dependency between the two crates, the same
//! split the teacher uses between its tools and runtime crates.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use wren_core::SessionId;
use wren_metrics::MetricsSnapshot;

use crate::builtin::BuiltinTool;
use crate::context::ToolContext;

/// Maximum delegation depth: a child at this depth may not delegate further.
pub const MAX_DELEGATION_DEPTH: u32 = 3;

/// Default wall-clock budget for a foreground (blocking) delegation.
pub const DEFAULT_DELEGATION_TIMEOUT: Duration = Duration::from_secs(300);

/// A request to run a child agent, as built by [`AssignTaskTool`].
#[derive(Debug, Clone)]
pub struct SubAgentRequest {
    /// The agent template id to run (falls back to a built-in default).
    pub agent: String,
    /// The task description/instructions handed to the child.
    pub task: String,
    /// The depth the child will run at (`parent + 1`).
    pub delegation_depth: u32,
    /// Wall-clock budget before the run is treated as timed out.
    pub timeout: Duration,
    /// If true, `spawn` returns immediately with a session id instead of
    /// awaiting completion.
    pub background: bool,
}

/// The outcome of a completed child agent run.
#[derive(Debug, Clone)]
pub struct SubAgentResult {
    /// Whether the run completed successfully.
    pub success: bool,
    /// The child's final assistant text, if successful.
    pub summary: String,
    /// Why the run failed, if it did.
    pub error: Option<String>,
    /// The id assigned to the spawned agent.
    pub agent_id: String,
    /// Wall-clock duration of the run.
    pub execution_time_ms: u64,
    /// Number of tool calls the child executed.
    pub tool_calls_executed: usize,
    /// Total tokens consumed by the child.
    pub tokens_used: u64,
    /// The child's full metrics snapshot.
    pub metrics: MetricsSnapshot,
}

/// What [`SubAgentSpawner::spawn`] returns immediately.
#[derive(Debug, Clone)]
pub enum DelegationOutcome {
    /// The child ran to completion (or failure) synchronously.
    Completed(SubAgentResult),
    /// The child was launched in the background; poll `task_output` with
    /// this id for its eventual result.
    Background(SessionId),
}

/// Spawns and tracks child agent runs. Implemented by the orchestrator
/// crate; injected into [`ToolContext`] before each turn.
#[async_trait]
pub trait SubAgentSpawner: Send + Sync {
    /// Launch a child agent per `request`.
    async fn spawn(&self, request: SubAgentRequest, ctx: &ToolContext) -> Result<DelegationOutcome, String>;

    /// Poll (or, if `block`, await up to `timeout`) a background session's
    /// result. Returns `None` if the session is still running and `block`
    /// is false, or once the per-call `timeout` elapses.
    async fn poll_background(
        &self,
        session_id: &SessionId,
        block: bool,
        timeout: Option<Duration>,
    ) -> Option<SubAgentResult>;
}

fn result_json(result: &SubAgentResult) -> Value {
    if result.success {
        serde_json::json!({
            "success": true,
            "summary": result.summary,
            "metadata": {
                "agentId": result.agent_id,
                "executionTimeMs": result.execution_time_ms,
                "toolCallsExecuted": result.tool_calls_executed,
                "tokensUsed": result.tokens_used,
            }
        })
    } else {
        serde_json::json!({
            "success": false,
            "error": result.error.clone().unwrap_or_else(|| "delegation failed".to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AssignTaskArgs {
    agent: String,
    task: String,
    #[serde(default)]
    background: bool,
}

/// The `assign_task` tool: delegates a task to a child agent, per the
/// depth-bounded delegation contract.
pub struct AssignTaskTool;

#[async_trait]
impl BuiltinTool for AssignTaskTool {
    fn name(&self) -> &str {
        "assign_task"
    }

    fn description(&self) -> &str {
        "Delegate a task to a specialist sub-agent and wait for its result."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "agent": {"type": "string", "description": "Agent template id to run"},
                "task": {"type": "string", "description": "Task instructions for the sub-agent"},
                "background": {"type": "boolean", "description": "Return immediately with a session id"},
            },
            "required": ["agent", "task"],
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        if ctx.delegation_depth >= MAX_DELEGATION_DEPTH {
            return Err("delegation depth exceeded".to_string());
        }

        let args: AssignTaskArgs = serde_json::from_value(args).map_err(|e| e.to_string())?;

        let spawner = ctx
            .subagent_spawner()
            .await
            .ok_or_else(|| "no delegation service configured".to_string())?;

        let request = SubAgentRequest {
            agent: args.agent,
            task: args.task,
            delegation_depth: ctx.delegation_depth + 1,
            timeout: DEFAULT_DELEGATION_TIMEOUT,
            background: args.background,
        };

        match spawner.spawn(request, ctx).await? {
            DelegationOutcome::Completed(result) => Ok(result_json(&result)),
            DelegationOutcome::Background(session_id) => Ok(serde_json::json!({
                "success": true,
                "session_id": session_id.as_str(),
            })),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaskOutputArgs {
    session_id: String,
    #[serde(default)]
    block: bool,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

/// The `task_output` tool: polls or blocks for a background delegation's
/// result.
pub struct TaskOutputTool;

#[async_trait]
impl BuiltinTool for TaskOutputTool {
    fn name(&self) -> &str {
        "task_output"
    }

    fn description(&self) -> &str {
        "Poll or block for the result of a background-delegated sub-agent task."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "session_id": {"type": "string"},
                "block": {"type": "boolean", "description": "Wait for completion instead of polling"},
                "timeout_ms": {"type": "integer", "description": "Per-call budget when blocking"},
            },
            "required": ["session_id"],
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, String> {
        let args: TaskOutputArgs = serde_json::from_value(args).map_err(|e| e.to_string())?;
        let spawner = ctx
            .subagent_spawner()
            .await
            .ok_or_else(|| "no delegation service configured".to_string())?;

        let session_id = SessionId::from_string(args.session_id);
        let timeout = args.timeout_ms.map(Duration::from_millis);

        match spawner.poll_background(&session_id, args.block, timeout).await {
            Some(result) => Ok(result_json(&result)),
            None => Ok(serde_json::json!({"status": "pending"})),
        }
    }
}
