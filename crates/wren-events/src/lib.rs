//! Event Port: the typed `AgentEvent` stream and its broadcast bus.
//!
//! Events are published to an [`EventBus`], which fans them out to any
//! number of async [`EventReceiver`]s and, for consumers that want
//! immediate inline notification instead, synchronous [`EventSubscriber`]s
//! registered against a [`SubscriberRegistry`].

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bus;
mod event;
mod subscriber;

pub use bus::{EventBus, EventReceiver, DEFAULT_CHANNEL_CAPACITY};
pub use event::{
    AgentEvent, EventEnvelope, EventMetadata, ToolCallSummary, ToolResultStatus, ToolResultSummary,
    Usage, EVENT_SCHEMA_VERSION,
};
pub use subscriber::{EventFilter, EventSubscriber, FilterSubscriber, SubscriberId, SubscriberRegistry};
