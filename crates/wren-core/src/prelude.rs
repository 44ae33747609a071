//! Convenient re-export of the most commonly used items in this crate.

// Cancellation
pub use crate::{Aborted, CancelToken};

// Identity
pub use crate::{AgentId, ConversationId, MessageId, SessionId, ToolCallId};

// Risk classification
pub use crate::RiskLevel;

// Time
pub use crate::{now, Timestamp};
