//! Broadcast-based event bus for asynchronous subscribers.

use crate::event::AgentEvent;
use crate::subscriber::SubscriberRegistry;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Default channel capacity for a freshly constructed [`EventBus`].
///
/// Sized generously: a lagging receiver only loses events, it never blocks
/// the publisher, so this is a memory/staleness tradeoff rather than a
/// correctness one.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Publishes [`AgentEvent`]s to any number of async subscribers.
///
/// Cloning an `EventBus` shares the same broadcast channel (new clones are
/// just another handle to the same sender) but gets its own
/// [`SubscriberRegistry`] for synchronous callbacks — registries are local
/// to the handle that owns them, matching the teacher's event-bus split
/// between the shared async channel and per-owner sync subscribers.
pub struct EventBus {
    sender: broadcast::Sender<Arc<AgentEvent>>,
    registry: SubscriberRegistry,
    capacity: usize,
}

impl EventBus {
    /// Construct a bus with [`DEFAULT_CHANNEL_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Construct a bus with an explicit broadcast channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            registry: SubscriberRegistry::new(),
            capacity,
        }
    }

    /// Publish an event to every async receiver and synchronous subscriber.
    ///
    /// Safe to call with zero receivers: `broadcast::Sender::send` only
    /// errors when there are no receivers, which is not a failure here.
    pub fn publish(&self, event: AgentEvent) {
        self.registry.notify(&event);
        let _ = self.sender.send(Arc::new(event));
    }

    /// Obtain a new asynchronous receiver. Events published before this
    /// call are not visible to it.
    #[must_use]
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            inner: self.sender.subscribe(),
        }
    }

    /// Register a synchronous callback subscriber on this handle.
    #[must_use]
    pub fn register_subscriber(
        &self,
        subscriber: impl crate::subscriber::EventSubscriber + 'static,
    ) -> crate::subscriber::SubscriberId {
        self.registry.register(subscriber)
    }

    /// Number of live asynchronous receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// The channel capacity this bus was constructed with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            registry: SubscriberRegistry::new(),
            capacity: self.capacity,
        }
    }
}

/// An asynchronous handle receiving events published to an [`EventBus`].
pub struct EventReceiver {
    inner: broadcast::Receiver<Arc<AgentEvent>>,
}

impl EventReceiver {
    /// Await the next event, skipping past (and warning on) any the
    /// receiver lagged behind and missed.
    pub async fn recv(&mut self) -> Option<Arc<AgentEvent>> {
        loop {
            match self.inner.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event receiver lagged; skipping missed events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll for the next event, if one is immediately ready.
    pub fn try_recv(&mut self) -> Option<Arc<AgentEvent>> {
        loop {
            match self.inner.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "event receiver lagged; skipping missed events");
                    continue;
                }
                Err(_) => return None,
            }
        }
    }
}
