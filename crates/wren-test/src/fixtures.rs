//! Test fixtures for common types.

use wren_approval::ApprovalRequest;
use wren_core::{AgentId, ConversationId, MessageId, RiskLevel, SessionId, ToolCallId};
use wren_llm::{FunctionCall, Message, ToolCall};

/// Build a fresh conversation id for a test.
#[must_use]
pub fn test_conversation_id() -> ConversationId {
    ConversationId::new()
}

/// Build a fresh agent id for a test.
#[must_use]
pub fn test_agent_id() -> AgentId {
    AgentId::new()
}

/// Build a fresh session id for a test.
#[must_use]
pub fn test_session_id() -> SessionId {
    SessionId::new()
}

/// Build a fresh message id for a test.
#[must_use]
pub fn test_message_id() -> MessageId {
    MessageId::new()
}

/// Build a fresh tool-call id for a test.
#[must_use]
pub fn test_tool_call_id() -> ToolCallId {
    ToolCallId::new()
}

/// Build a plain-text user message fixture.
#[must_use]
pub fn test_user_message(text: impl Into<String>) -> Message {
    Message::user(text)
}

/// Build a plain-text assistant message fixture.
#[must_use]
pub fn test_assistant_message(text: impl Into<String>) -> Message {
    Message::assistant_text(text)
}

/// Build a tool-call fixture with a freshly minted id.
#[must_use]
pub fn test_tool_call(name: impl Into<String>, arguments: impl Into<String>) -> ToolCall {
    ToolCall {
        id: test_tool_call_id().to_string(),
        function: FunctionCall {
            name: name.into(),
            arguments: arguments.into(),
        },
    }
}

/// Build a medium-risk approval request fixture for `tool_name`.
#[must_use]
pub fn test_approval_request(tool_name: impl Into<String>) -> ApprovalRequest {
    ApprovalRequest::new(
        test_tool_call_id(),
        test_conversation_id(),
        tool_name,
        serde_json::json!({}),
        RiskLevel::Medium,
        "test fixture",
    )
}

/// Build a high-risk approval request fixture for `tool_name`.
#[must_use]
pub fn test_high_risk_approval_request(tool_name: impl Into<String>) -> ApprovalRequest {
    ApprovalRequest::new(
        test_tool_call_id(),
        test_conversation_id(),
        tool_name,
        serde_json::json!({}),
        RiskLevel::High,
        "test fixture",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_fixtures_are_unique_per_call() {
        assert_ne!(test_agent_id(), test_agent_id());
        assert_ne!(test_session_id(), test_session_id());
        assert_ne!(test_conversation_id(), test_conversation_id());
    }

    #[test]
    fn message_fixtures_carry_their_text() {
        let user = test_user_message("hello");
        assert_eq!(user.content.as_text(), "hello");
        let assistant = test_assistant_message("hi back");
        assert_eq!(assistant.content.as_text(), "hi back");
    }

    #[test]
    fn tool_call_fixture_carries_name_and_arguments() {
        let call = test_tool_call("read_file", r#"{"path":"a"}"#);
        assert_eq!(call.function.name, "read_file");
        assert_eq!(call.function.arguments, r#"{"path":"a"}"#);
    }

    #[test]
    fn approval_request_fixtures_carry_their_risk_level() {
        let request = test_approval_request("fs:read_file");
        assert_eq!(request.risk_level, RiskLevel::Medium);
        let high = test_high_risk_approval_request("fs:delete_file");
        assert_eq!(high.risk_level, RiskLevel::High);
    }
}
