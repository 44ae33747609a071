//! Synchronous callback subscribers, for consumers that want immediate
//! notification rather than polling an [`crate::EventReceiver`].

use crate::event::AgentEvent;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle identifying a registered subscriber, returned by
/// [`SubscriberRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// A synchronous callback invoked for every published event.
pub trait EventSubscriber: Send + Sync {
    /// Handle one event. Must not block for long — this runs inline with
    /// the publisher.
    fn on_event(&self, event: &AgentEvent);
}

impl<F> EventSubscriber for F
where
    F: Fn(&AgentEvent) + Send + Sync,
{
    fn on_event(&self, event: &AgentEvent) {
        self(event)
    }
}

/// A predicate deciding whether an event is relevant to a given subscriber.
pub type EventFilter = Arc<dyn Fn(&AgentEvent) -> bool + Send + Sync>;

/// Wraps an [`EventSubscriber`] so it only sees events passing `filter`.
pub struct FilterSubscriber<S> {
    filter: EventFilter,
    inner: S,
}

impl<S: EventSubscriber> FilterSubscriber<S> {
    /// Wrap `inner`, restricting it to events for which `filter` returns true.
    pub fn new(filter: EventFilter, inner: S) -> Self {
        Self { filter, inner }
    }
}

impl<S: EventSubscriber> EventSubscriber for FilterSubscriber<S> {
    fn on_event(&self, event: &AgentEvent) {
        if (self.filter)(event) {
            self.inner.on_event(event);
        }
    }
}

/// Registry of synchronous subscribers, notified in registration order.
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriberId, Box<dyn EventSubscriber>)>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber, returning a handle that can later unregister it.
    pub fn register(&self, subscriber: impl EventSubscriber + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, Box::new(subscriber)));
        id
    }

    /// Remove a previously registered subscriber. Returns `false` if the id
    /// was already removed or never existed.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Invoke every registered subscriber with `event`, in registration order.
    pub fn notify(&self, event: &AgentEvent) {
        for (_, subscriber) in self.entries.lock().iter() {
            subscriber.on_event(event);
        }
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether any subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
