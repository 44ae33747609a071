//! Stable identifiers threaded through the orchestrator, tool layer, and
//! event stream.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($name:ident, $prefix:literal) => {
        #[doc = concat!("Opaque `", $prefix, "` identifier.")]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Wrap an existing id string (e.g. one read back from storage).
            #[must_use]
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the id as a plain string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(ConversationId, "conversation");
opaque_id!(MessageId, "message");
opaque_id!(ToolCallId, "tool_call");
opaque_id!(AgentId, "agent");
opaque_id!(SessionId, "session");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(ConversationId::new(), ConversationId::new());
    }

    #[test]
    fn round_trips_through_string() {
        let id = MessageId::new();
        let restored = MessageId::from_string(id.as_str().to_string());
        assert_eq!(id, restored);
    }

    #[test]
    fn display_matches_as_str() {
        let id = AgentId::new();
        assert_eq!(id.to_string(), id.as_str());
    }
}
