//! The opaque context threaded through every tool execution.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use wren_approval::ApprovalManager;
use wren_core::{CancelToken, ConversationId, MessageId};
use wren_events::EventBus;

use crate::delegation::SubAgentSpawner;

/// Shared, per-batch context available to every child port and tool body.
///
/// Carries everything the specification's "opaque context" needs: the
/// event port, the conversation/message this batch belongs to, the
/// approval manager, the cancellation signal, and the workspace root.
#[derive(Clone)]
pub struct ToolContext {
    /// Where to emit `tool_calls`/`tool_result`/sub-agent events.
    pub event_bus: Arc<EventBus>,
    /// The conversation this batch of invocations belongs to.
    pub conversation_id: ConversationId,
    /// The assistant message that requested this batch.
    pub message_id: MessageId,
    /// Gates execution of invocations whose risk requires approval.
    pub approval: Arc<ApprovalManager>,
    /// Cooperative cancellation, checked before and during execution.
    pub cancel: CancelToken,
    /// Root directory tool bodies should treat as their sandbox.
    pub workspace_root: PathBuf,
    /// How many delegation hops deep this context already is.
    pub delegation_depth: u32,
    /// Set by the runtime before each turn so [`crate::delegation::AssignTaskTool`]
    /// can reach the delegation service without a circular crate dependency.
    subagent_spawner: Arc<RwLock<Option<Arc<dyn SubAgentSpawner>>>>,
}

impl ToolContext {
    /// Build a top-level context (delegation depth zero).
    #[must_use]
    pub fn new(
        event_bus: Arc<EventBus>,
        conversation_id: ConversationId,
        message_id: MessageId,
        approval: Arc<ApprovalManager>,
        cancel: CancelToken,
        workspace_root: PathBuf,
    ) -> Self {
        Self {
            event_bus,
            conversation_id,
            message_id,
            approval,
            cancel,
            workspace_root,
            delegation_depth: 0,
            subagent_spawner: Arc::new(RwLock::new(None)),
        }
    }

    /// Derive a child context for a delegated sub-agent: a fresh child
    /// cancellation token and an incremented delegation depth, everything
    /// else carried over.
    #[must_use]
    pub fn child(&self, message_id: MessageId) -> Self {
        Self {
            event_bus: self.event_bus.clone(),
            conversation_id: self.conversation_id.clone(),
            message_id,
            approval: self.approval.clone(),
            cancel: self.cancel.child(),
            workspace_root: self.workspace_root.clone(),
            delegation_depth: self.delegation_depth + 1,
            subagent_spawner: Arc::new(RwLock::new(None)),
        }
    }

    /// Install the delegation service the `assign_task`/`task_output` tools
    /// should call through. Called by the runtime at the start of each turn.
    pub async fn set_subagent_spawner(&self, spawner: Option<Arc<dyn SubAgentSpawner>>) {
        *self.subagent_spawner.write().await = spawner;
    }

    /// The currently installed delegation service, if any.
    pub async fn subagent_spawner(&self) -> Option<Arc<dyn SubAgentSpawner>> {
        self.subagent_spawner.read().await.clone()
    }
}
