//! The decision an approval hook returns for one invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the approval hook decided for one tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum ApprovalDecision {
    /// Execute once; no allowance is recorded.
    AllowOnce,
    /// Execute, and remember this tool name as pre-approved for the rest of
    /// the conversation.
    AllowSession,
    /// Refuse execution.
    Deny {
        /// Why the request was denied, surfaced back to the model.
        reason: String,
    },
    /// Execute, but with `new_arguments` substituted for the model's
    /// original arguments.
    Edit {
        /// The replacement arguments.
        new_arguments: Value,
    },
}

impl ApprovalDecision {
    /// Whether this decision allows execution to proceed.
    #[must_use]
    pub fn allows_execution(&self) -> bool {
        !matches!(self, Self::Deny { .. })
    }

    /// Whether this decision should be remembered for the rest of the
    /// conversation.
    #[must_use]
    pub fn persists_for_session(&self) -> bool {
        matches!(self, Self::AllowSession)
    }

    /// The replacement arguments, if this decision is an [`ApprovalDecision::Edit`].
    #[must_use]
    pub fn edited_arguments(&self) -> Option<&Value> {
        match self {
            Self::Edit { new_arguments } => Some(new_arguments),
            _ => None,
        }
    }

    /// The denial reason, if this decision is a [`ApprovalDecision::Deny`].
    #[must_use]
    pub fn denial_reason(&self) -> Option<&str> {
        match self {
            Self::Deny { reason } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_deny_blocks_execution() {
        assert!(ApprovalDecision::AllowOnce.allows_execution());
        assert!(ApprovalDecision::AllowSession.allows_execution());
        assert!(ApprovalDecision::Edit {
            new_arguments: serde_json::json!({}),
        }
        .allows_execution());
        assert!(!ApprovalDecision::Deny {
            reason: "no".into(),
        }
        .allows_execution());
    }

    #[test]
    fn only_allow_session_persists() {
        assert!(ApprovalDecision::AllowSession.persists_for_session());
        assert!(!ApprovalDecision::AllowOnce.persists_for_session());
    }

    #[test]
    fn edit_exposes_replacement_arguments() {
        let decision = ApprovalDecision::Edit {
            new_arguments: serde_json::json!({"path": "/safe"}),
        };
        assert_eq!(
            decision.edited_arguments(),
            Some(&serde_json::json!({"path": "/safe"}))
        );
    }
}
