//! Shared primitives for the Wren agent runtime: opaque ids, timestamps,
//! risk classification, and cooperative cancellation.
//!
//! Every other `wren-*` crate depends on this one; it depends on nothing
//! in the workspace.

mod cancel;
mod ids;
mod risk;
mod time;
pub mod prelude;

pub use cancel::{Aborted, CancelToken};
pub use ids::{AgentId, ConversationId, MessageId, SessionId, ToolCallId};
pub use risk::RiskLevel;
pub use time::{now, Timestamp};
