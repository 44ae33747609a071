//! Tool Port, Composite Tool Port, the built-in tool contract, the MCP
//! bridge port, and the `assign_task`/`task_output` delegation tools.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod builtin;
mod context;
mod delegation;
mod error;
mod mcp;
mod port;
pub mod prelude;
pub mod system_prompt;
pub mod truncate;

pub use builtin::{BuiltinTool, BuiltinToolPort};
pub use context::ToolContext;
pub use delegation::{
    AssignTaskTool, DelegationOutcome, SubAgentRequest, SubAgentResult, SubAgentSpawner,
    TaskOutputTool, DEFAULT_DELEGATION_TIMEOUT, MAX_DELEGATION_DEPTH,
};
pub use error::{ToolError, ToolOutcome};
pub use mcp::{McpBridgePort, McpServerConnection};
pub use port::{CompositeToolPort, ToolPort};
