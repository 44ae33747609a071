//! Convenient re-export of the most commonly used items in this crate.

// Errors
pub use crate::{ApprovalError, ApprovalResult};

// Decisions and requests
pub use crate::{ApprovalDecision, ApprovalRequest};

// Hooks
pub use crate::{AlwaysAllow, AlwaysDeny, ApprovalHook};

// Manager
pub use crate::ApprovalManager;
