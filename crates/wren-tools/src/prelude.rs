//! Convenient re-export of the most commonly used items in this crate.

// Errors
pub use crate::{ToolError, ToolOutcome};

// Tool port and composite dispatch
pub use crate::{CompositeToolPort, ToolContext, ToolPort};

// Built-in tool contract
pub use crate::{BuiltinTool, BuiltinToolPort};

// MCP bridge
pub use crate::{McpBridgePort, McpServerConnection};

// Delegation
pub use crate::{
    AssignTaskTool, DelegationOutcome, SubAgentRequest, SubAgentResult, SubAgentSpawner,
    TaskOutputTool, DEFAULT_DELEGATION_TIMEOUT, MAX_DELEGATION_DEPTH,
};
