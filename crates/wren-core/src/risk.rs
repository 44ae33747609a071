//! Risk classification shared by the approval hook and audit-style logging.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How dangerous a sensitive action is judged to be.
///
/// Ordered low to high; `PartialOrd`/`Ord` follow declaration order so
/// callers can write `level >= RiskLevel::High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Read-only or fully reversible.
    Low,
    /// Reversible but side-effecting (e.g. writing a scratch file).
    Medium,
    /// Hard to reverse or affects shared state.
    High,
    /// Destructive or irreversible.
    Critical,
}

impl RiskLevel {
    /// Whether this level requires explicit human approval before execution.
    #[must_use]
    pub fn requires_approval(self) -> bool {
        self >= RiskLevel::Medium
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_low_to_critical() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn only_medium_and_above_require_approval() {
        assert!(!RiskLevel::Low.requires_approval());
        assert!(RiskLevel::Medium.requires_approval());
        assert!(RiskLevel::High.requires_approval());
        assert!(RiskLevel::Critical.requires_approval());
    }
}
