//! Convenient re-export of the most commonly used items in this crate.

// Accumulator
pub use crate::{MetricsAccumulator, SubscriberId};

// Snapshots
pub use crate::{ContextWindow, LlmCallUsage, MetricsSnapshot};
