//! Tracks background delegation results and bounds how many sub-agents can
//! run concurrently across a conversation tree.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Notify, RwLock, Semaphore};
use wren_core::SessionId;
use wren_tools::SubAgentResult;

use crate::config::MIN_BACKGROUND_SESSION_RETENTION;

struct CompletedEntry {
    result: SubAgentResult,
    completed_at: chrono::DateTime<Utc>,
}

/// Bounds concurrent sub-agent execution and retains completed background
/// delegation results for at least [`MIN_BACKGROUND_SESSION_RETENTION`],
/// regardless of whether they've already been polled.
pub struct DelegationPool {
    semaphore: Arc<Semaphore>,
    completed: RwLock<HashMap<SessionId, CompletedEntry>>,
    notify: Notify,
    min_retention: Duration,
}

impl DelegationPool {
    /// Build a pool bounding concurrent sub-agents to `max_concurrent_subagents`.
    #[must_use]
    pub fn new(max_concurrent_subagents: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent_subagents.max(1))),
            completed: RwLock::new(HashMap::new()),
            notify: Notify::new(),
            min_retention: MIN_BACKGROUND_SESSION_RETENTION,
        }
    }

    /// The shared concurrency gate. Callers acquire a permit before
    /// spawning a background (or foreground) child run.
    #[must_use]
    pub fn semaphore(&self) -> Arc<Semaphore> {
        self.semaphore.clone()
    }

    /// Record a background delegation's result, making it visible to
    /// `poll` and waking anyone blocked on it.
    pub async fn record_background(&self, session_id: SessionId, result: SubAgentResult) {
        let mut completed = self.completed.write().await;
        evict_expired(&mut completed, self.min_retention);
        completed.insert(session_id, CompletedEntry { result, completed_at: Utc::now() });
        drop(completed);
        self.notify.notify_waiters();
    }

    /// Look up a background session's result. If `block` is false, returns
    /// immediately (`None` if still running). If `block` is true, waits for
    /// completion, up to `timeout` if given, otherwise indefinitely.
    pub async fn poll(&self, session_id: &SessionId, block: bool, timeout: Option<Duration>) -> Option<SubAgentResult> {
        if let Some(result) = self.peek(session_id).await {
            return Some(result);
        }
        if !block {
            return None;
        }

        let deadline = timeout.map(|d| tokio::time::Instant::now() + d);
        loop {
            let notified = self.notify.notified();
            let woke = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, notified).await.is_ok(),
                None => {
                    notified.await;
                    true
                }
            };
            if let Some(result) = self.peek(session_id).await {
                return Some(result);
            }
            if !woke {
                return None;
            }
        }
    }

    async fn peek(&self, session_id: &SessionId) -> Option<SubAgentResult> {
        self.completed.read().await.get(session_id).map(|entry| entry.result.clone())
    }
}

fn evict_expired(completed: &mut HashMap<SessionId, CompletedEntry>, min_retention: Duration) {
    let Ok(min_retention) = chrono::Duration::from_std(min_retention) else { return };
    let now = Utc::now();
    completed.retain(|_, entry| now - entry.completed_at < min_retention);
}
