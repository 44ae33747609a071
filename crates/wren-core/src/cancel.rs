//! Cooperative cancellation shared by the orchestrator, transport, and
//! delegation service.

use std::fmt;
use tokio_util::sync::CancellationToken;

/// A cloneable cancellation handle threaded through a single `send()` call
/// (and, via [`CancelToken::child`], into sub-agent runs spawned from it).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(CancellationToken);

impl CancelToken {
    /// Create a fresh, un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    /// Signal cancellation to this token and every clone/child of it.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolves once cancellation has been requested. Intended for use in
    /// `tokio::select!` at every suspension point.
    pub async fn cancelled(&self) {
        self.0.cancelled().await;
    }

    /// Derive a child token: cancelling the parent cancels the child, but
    /// cancelling the child alone does not propagate back up. Used when a
    /// sub-agent's own timeout should not abort its parent.
    #[must_use]
    pub fn child(&self) -> Self {
        Self(self.0.child_token())
    }
}

/// The single terminal error produced by cancellation or deadline expiry.
///
/// Both sources collapse to this one type (per spec.md §7: "Expired
/// deadlines raise the same `Aborted` as explicit cancellation") so callers
/// never need to distinguish "who cancelled me."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aborted;

impl fmt::Display for Aborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation aborted (cancelled or deadline exceeded)")
    }
}

impl std::error::Error for Aborted {}
