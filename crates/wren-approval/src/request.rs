//! Types describing one pending approval decision.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wren_core::{ConversationId, RiskLevel, Timestamp, ToolCallId};

/// A tool invocation awaiting an approval decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// The call this request gates.
    pub tool_call_id: ToolCallId,
    /// The conversation the call belongs to, for per-conversation allow sets.
    pub conversation_id: ConversationId,
    /// Tool name, possibly namespaced as `"server:tool"`.
    pub tool_name: String,
    /// The arguments the model proposed, as parsed JSON.
    pub arguments: Value,
    /// The risk level assigned to this invocation.
    pub risk_level: RiskLevel,
    /// Why the agent wants to perform this action, for display to the approver.
    pub context: String,
    /// When the request was raised.
    pub timestamp: Timestamp,
}

impl ApprovalRequest {
    /// Build a new request, stamping the current time.
    #[must_use]
    pub fn new(
        tool_call_id: ToolCallId,
        conversation_id: ConversationId,
        tool_name: impl Into<String>,
        arguments: Value,
        risk_level: RiskLevel,
        context: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id,
            conversation_id,
            tool_name: tool_name.into(),
            arguments,
            risk_level,
            context: context.into(),
            timestamp: wren_core::now(),
        }
    }
}
