//! Convenient re-export of the most commonly used items in this crate.

// Errors
pub use crate::{LlmError, LlmResult};

// Provider trait and config
pub use crate::{LlmProvider, ProviderConfig, RetryConfig, StreamBox};

// Providers
pub use crate::OpenAiCompatProvider;

// Message types
pub use crate::{
    ContentPart, FunctionCall, ImagePart, Message, MessageContent, MessageRole,
};

// Response types
pub use crate::{LlmResponse, Model, ModelLimits, StopReason, Usage};

// Tool types
pub use crate::{ToolCall, ToolExecutionResult, ToolResultKind, ToolResultStatus};

// Streaming
pub use crate::{SseEvent, SseParser};
