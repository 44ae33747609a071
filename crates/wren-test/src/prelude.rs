//! Convenient re-export of the most commonly used items in this crate.

// Fixtures
pub use crate::{
    test_agent_id, test_approval_request, test_assistant_message, test_conversation_id,
    test_high_risk_approval_request, test_message_id, test_session_id, test_tool_call,
    test_tool_call_id, test_user_message,
};

// Mocks
pub use crate::{MockLlmProvider, RecordedCall, ScriptedTool};

// Contract suite
pub use crate::memory_port_contract_suite;

// Event assertions
pub use crate::{drain_available, recv_matching};
