//! The shape of a `send()` call's input.

use wren_core::{now, MessageId};
use wren_llm::{ContentPart, Message, MessageContent, MessageRole};

/// What a caller hands to [`crate::Orchestrator::send`]: either plain text
/// or a multi-part message (text interleaved with images).
#[derive(Debug, Clone)]
pub enum UserMessagePayload {
    /// Plain text content.
    Text(String),
    /// Multi-part content, e.g. text alongside one or more images.
    Parts(Vec<ContentPart>),
}

impl UserMessagePayload {
    /// Build the user [`Message`] this payload represents.
    #[must_use]
    pub fn into_message(self) -> Message {
        let content = match self {
            Self::Text(text) => MessageContent::Text(text),
            Self::Parts(parts) => MessageContent::Parts(parts),
        };
        Message {
            id: MessageId::new(),
            role: MessageRole::User,
            content,
            tool_calls: None,
            tool_call_id: None,
            name: None,
            timestamp: now(),
            sub_agent_id: None,
        }
    }

    /// A flattened text preview, for attaching to `message_started` events.
    #[must_use]
    pub fn preview_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => MessageContent::Parts(parts.clone()).as_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_payload_becomes_a_user_message() {
        let message = UserMessagePayload::Text("hello".to_string()).into_message();
        assert_eq!(message.role, MessageRole::User);
        assert_eq!(message.content.as_text(), "hello");
    }

    #[test]
    fn parts_payload_preview_collapses_to_text() {
        let payload = UserMessagePayload::Parts(vec![ContentPart::Text { text: "look at this".to_string() }]);
        assert_eq!(payload.preview_text(), "look at this");
    }
}
