//! Small helpers for asserting on events published to an [`EventBus`]
//! during a test.

use std::sync::Arc;
use std::time::Duration;

use wren_events::{AgentEvent, EventReceiver};

/// Wait (bounded by `timeout`) for the next event on `receiver` matching
/// `predicate`, skipping past any non-matching events first.
///
/// # Panics
///
/// Panics if `timeout` elapses before a matching event arrives, or the bus
/// is closed before one does — appropriate for test assertions, where a
/// missing event is a test failure rather than something to propagate as a
/// `Result`.
pub async fn recv_matching(
    receiver: &mut EventReceiver,
    timeout: Duration,
    predicate: impl Fn(&AgentEvent) -> bool,
) -> Arc<AgentEvent> {
    tokio::time::timeout(timeout, async {
        loop {
            let event = receiver.recv().await.expect("event bus closed before a matching event arrived");
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for a matching event")
}

/// Drain every event currently queued on `receiver` without blocking.
#[must_use]
pub fn drain_available(receiver: &mut EventReceiver) -> Vec<Arc<AgentEvent>> {
    let mut events = Vec::new();
    while let Some(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use wren_core::{ConversationId, MessageId};
    use wren_events::{EventBus, EventMetadata};

    fn sample_event() -> AgentEvent {
        AgentEvent::Done {
            meta: EventMetadata::new(ConversationId::new(), MessageId::new()),
            response_time_ms: 1,
            usage: wren_events::Usage {
                prompt_tokens: 0,
                completion_tokens: 0,
                total_tokens: 0,
                reasoning_tokens: None,
                cost: None,
            },
        }
    }

    #[tokio::test]
    async fn recv_matching_skips_non_matching_events() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();
        bus.publish(AgentEvent::MemoryAppended {
            meta: EventMetadata::new(ConversationId::new(), MessageId::new()),
            role: "user".to_string(),
        });
        bus.publish(sample_event());

        let event = recv_matching(&mut receiver, Duration::from_millis(100), |e| e.event_type() == "done").await;
        assert_eq!(event.event_type(), "done");
    }

    #[tokio::test]
    #[should_panic(expected = "timed out")]
    async fn recv_matching_panics_on_timeout() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();
        recv_matching(&mut receiver, Duration::from_millis(20), |e| e.event_type() == "done").await;
    }

    #[tokio::test]
    async fn drain_available_returns_every_queued_event_without_blocking() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();
        bus.publish(sample_event());
        bus.publish(sample_event());

        let drained = drain_available(&mut receiver);
        assert_eq!(drained.len(), 2);
        assert!(drain_available(&mut receiver).is_empty());
    }
}
