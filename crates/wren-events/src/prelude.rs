//! Convenience re-export of the common event types.

pub use crate::{AgentEvent, EventBus, EventEnvelope, EventMetadata, EventReceiver, EventSubscriber};
