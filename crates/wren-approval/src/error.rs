//! Approval-layer error type.

use thiserror::Error;

/// Errors raised while consulting or managing approvals.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// The hook itself failed (e.g. the UI channel closed).
    #[error("approval hook failed: {0}")]
    HookFailed(String),
    /// The approval was cancelled before a decision was made.
    #[error("approval request was cancelled")]
    Aborted(#[from] wren_core::Aborted),
}

/// Result alias for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
