//! Mutable accumulator guarding a [`MetricsSnapshot`] plus its subscribers.

use crate::snapshot::{ContextWindow, LlmCallUsage, MetricsSnapshot};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle returned by [`MetricsAccumulator::subscribe`]; drop it or call
/// [`MetricsAccumulator::unsubscribe`] with it to stop receiving snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn Fn(&MetricsSnapshot) + Send + Sync>;

struct Inner {
    snapshot: MetricsSnapshot,
    subscribers: Vec<(SubscriberId, Subscriber)>,
}

/// Per-conversation token/cost/tool-call accumulator.
///
/// Cheaply cloneable (an `Arc` around shared state) so the orchestrator and
/// any sub-agent it spawns can hold independent handles to the same totals.
#[derive(Clone)]
pub struct MetricsAccumulator {
    inner: Arc<Mutex<Inner>>,
    next_subscriber_id: Arc<AtomicU64>,
}

impl Default for MetricsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsAccumulator {
    /// Start a fresh accumulator at all-zero totals.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                snapshot: MetricsSnapshot::default(),
                subscribers: Vec::new(),
            })),
            next_subscriber_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Read the current totals without subscribing.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().snapshot.clone()
    }

    /// Register a callback invoked with a full, independent copy of the
    /// snapshot after every mutation.
    pub fn subscribe<F>(&self, callback: F) -> SubscriberId
    where
        F: Fn(&MetricsSnapshot) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed));
        self.inner.lock().subscribers.push((id, Box::new(callback)));
        id
    }

    /// Stop notifying the subscriber registered under `id`.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.inner.lock().subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    /// Record one LLM call's usage, incrementing `llm_call_count`.
    pub fn record_llm_call(&self, usage: LlmCallUsage) {
        self.mutate(|snapshot| {
            snapshot.prompt_tokens += usage.prompt_tokens;
            snapshot.completion_tokens += usage.completion_tokens;
            snapshot.cached_tokens += usage.cached_tokens;
            snapshot.reasoning_tokens += usage.reasoning_tokens;
            snapshot.total_tokens += usage.prompt_tokens + usage.completion_tokens;
            snapshot.cost += usage.cost;
            snapshot.llm_call_count += 1;
        });
    }

    /// Record one completed tool call.
    pub fn record_tool_call(&self) {
        self.mutate(|snapshot| snapshot.tool_call_count += 1);
    }

    /// Record one completed `send()` request and its wall-clock duration.
    pub fn record_request_complete(&self, duration_ms: u64) {
        self.mutate(|snapshot| {
            snapshot.request_count += 1;
            snapshot.total_time_ms += duration_ms;
        });
    }

    /// Report the provider's declared context limit and current usage.
    pub fn set_context_window(&self, limit: u64, usage: u64) {
        self.mutate(|snapshot| snapshot.context_window = Some(ContextWindow { limit, usage }));
    }

    fn mutate(&self, f: impl FnOnce(&mut MetricsSnapshot)) {
        let mut guard = self.inner.lock();
        f(&mut guard.snapshot);
        let snapshot = guard.snapshot.clone();
        for (_, subscriber) in &guard.subscribers {
            subscriber(&snapshot);
        }
    }
}
