//! The approval hook port: an injected async decision function.

use async_trait::async_trait;
use wren_core::CancelToken;

use crate::decision::ApprovalDecision;
use crate::error::ApprovalResult;
use crate::request::ApprovalRequest;

/// External decision function gating each tool execution.
///
/// The orchestrator and tool execution layer never block on terminal I/O
/// themselves; they call through this port and await whatever UI, policy
/// engine, or test fixture implements it.
#[async_trait]
pub trait ApprovalHook: Send + Sync {
    /// Ask for a decision on `request`, honoring `cancel`.
    async fn decide(
        &self,
        request: &ApprovalRequest,
        cancel: &CancelToken,
    ) -> ApprovalResult<ApprovalDecision>;
}

/// A hook that allows everything once, without ever persisting an
/// allowance. Useful for tests and for running without approval gating.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAllow;

#[async_trait]
impl ApprovalHook for AlwaysAllow {
    async fn decide(
        &self,
        _request: &ApprovalRequest,
        _cancel: &CancelToken,
    ) -> ApprovalResult<ApprovalDecision> {
        Ok(ApprovalDecision::AllowOnce)
    }
}

/// A hook that denies everything, recording a fixed reason. Useful for
/// tests exercising the deny path.
#[derive(Debug, Clone)]
pub struct AlwaysDeny {
    reason: String,
}

impl AlwaysDeny {
    /// Deny every request with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ApprovalHook for AlwaysDeny {
    async fn decide(
        &self,
        _request: &ApprovalRequest,
        _cancel: &CancelToken,
    ) -> ApprovalResult<ApprovalDecision> {
        Ok(ApprovalDecision::Deny {
            reason: self.reason.clone(),
        })
    }
}
