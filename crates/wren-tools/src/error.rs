//! Tool-layer error type.

use thiserror::Error;

/// Errors raised while validating or executing a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The model's arguments failed schema/semantic validation.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool body raised an error while running.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// No child port owns this tool name.
    #[error("no tool found for {0}")]
    NotFound(String),

    /// The approval hook denied this invocation.
    #[error("denied: {0}")]
    Denied(String),

    /// Execution was cancelled before or during the call.
    #[error("aborted")]
    Aborted(#[from] wren_core::Aborted),

    /// The approval hook itself failed.
    #[error("approval failed: {0}")]
    ApprovalFailed(#[from] wren_approval::ApprovalError),
}

/// Result alias for tool operations.
pub type ToolOutcome<T> = Result<T, ToolError>;
