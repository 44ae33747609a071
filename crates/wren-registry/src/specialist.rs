//! `SpecialistAgentConfig`: a template materialized at delegation time.

use std::collections::HashMap;

use serde_json::Value;
use wren_core::{AgentId, ConversationId, MessageId, ToolCallId};

use crate::error::{RegistryError, RegistryResult};
use crate::template::AgentTemplate;

/// Fallback values drawn from the delegating conversation, used to fill in
/// whatever a template leaves unset.
#[derive(Debug, Clone, Default)]
pub struct DelegatingDefaults {
    /// Provider to fall back to.
    pub provider: Option<String>,
    /// Model to fall back to.
    pub model: Option<String>,
    /// Sampling temperature to fall back to.
    pub temperature: Option<f32>,
    /// Max output tokens to fall back to.
    pub max_tokens: Option<u32>,
    /// Nucleus sampling value to fall back to.
    pub top_p: Option<f32>,
    /// Timeout to fall back to.
    pub timeout_ms: Option<u64>,
    /// Tool set to fall back to when the template doesn't restrict one.
    pub tools: Vec<String>,
}

/// A fully resolved specialist agent run: a template merged with the
/// delegating conversation's defaults, plus the identifiers that tie it back
/// to the parent turn.
#[derive(Debug, Clone)]
pub struct SpecialistAgentConfig {
    /// Freshly assigned id for this child run.
    pub agent_id: AgentId,
    /// The task description handed to the child.
    pub task_description: String,
    /// This run's depth; always in `1..=max_depth`.
    pub delegation_depth: u32,
    /// The parent conversation this delegation originated from.
    pub conversation_id: ConversationId,
    /// The parent message the delegating tool call belongs to.
    pub message_id: MessageId,
    /// The tool call that triggered this delegation.
    pub tool_call_id: ToolCallId,
    /// Resolved system prompt.
    pub system_prompt: String,
    /// Resolved tool set.
    pub tools: Vec<String>,
    /// Resolved provider.
    pub provider: Option<String>,
    /// Resolved model.
    pub model: Option<String>,
    /// Resolved sampling temperature.
    pub temperature: Option<f32>,
    /// Resolved max output tokens.
    pub max_tokens: Option<u32>,
    /// Resolved nucleus sampling value.
    pub top_p: Option<f32>,
    /// Resolved wall-clock budget.
    pub timeout_ms: Option<u64>,
    /// Whether the child shares the parent's conversation context.
    pub share_context: bool,
    /// Metadata carried over from the template.
    pub metadata: HashMap<String, Value>,
}

impl SpecialistAgentConfig {
    /// Merge `template` with `defaults` into a config for a child run at
    /// `delegation_depth`. Fails if the depth invariant (`1..=max_depth`) is
    /// violated — the caller should reject the delegation without spawning.
    #[allow(clippy::too_many_arguments)]
    pub fn materialize(
        template: &AgentTemplate,
        defaults: &DelegatingDefaults,
        task_description: impl Into<String>,
        delegation_depth: u32,
        max_depth: u32,
        conversation_id: ConversationId,
        message_id: MessageId,
        tool_call_id: ToolCallId,
    ) -> RegistryResult<Self> {
        if delegation_depth < 1 || delegation_depth > max_depth {
            return Err(RegistryError::DepthExceeded { depth: delegation_depth, max: max_depth });
        }

        let tools = if template.tools.is_empty() { defaults.tools.clone() } else { template.tools.clone() };

        Ok(Self {
            agent_id: AgentId::new(),
            task_description: task_description.into(),
            delegation_depth,
            conversation_id,
            message_id,
            tool_call_id,
            system_prompt: template.system_prompt.clone(),
            tools,
            provider: template.provider.clone().or_else(|| defaults.provider.clone()),
            model: template.model.clone().or_else(|| defaults.model.clone()),
            temperature: template.temperature.or(defaults.temperature),
            max_tokens: template.max_tokens.or(defaults.max_tokens),
            top_p: template.top_p.or(defaults.top_p),
            timeout_ms: template.timeout_ms.or(defaults.timeout_ms),
            share_context: template.share_context.unwrap_or(false),
            metadata: template.metadata.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> AgentTemplate {
        AgentTemplate::from_yaml("systemPrompt: Review code.\n").unwrap()
    }

    #[test]
    fn depth_zero_is_rejected() {
        let result = SpecialistAgentConfig::materialize(
            &template(),
            &DelegatingDefaults::default(),
            "look at this",
            0,
            3,
            ConversationId::new(),
            MessageId::new(),
            ToolCallId::new(),
        );
        assert!(matches!(result, Err(RegistryError::DepthExceeded { depth: 0, max: 3 })));
    }

    #[test]
    fn depth_past_max_is_rejected() {
        let result = SpecialistAgentConfig::materialize(
            &template(),
            &DelegatingDefaults::default(),
            "look at this",
            4,
            3,
            ConversationId::new(),
            MessageId::new(),
            ToolCallId::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn template_tools_win_over_defaults_when_present() {
        let mut template = template();
        template.tools = vec!["read_file".to_string()];
        let defaults = DelegatingDefaults { tools: vec!["shell".to_string()], ..Default::default() };
        let config = SpecialistAgentConfig::materialize(
            &template,
            &defaults,
            "task",
            1,
            3,
            ConversationId::new(),
            MessageId::new(),
            ToolCallId::new(),
        )
        .unwrap();
        assert_eq!(config.tools, vec!["read_file".to_string()]);
    }

    #[test]
    fn empty_template_tools_fall_back_to_defaults() {
        let defaults = DelegatingDefaults { tools: vec!["shell".to_string()], ..Default::default() };
        let config = SpecialistAgentConfig::materialize(
            &template(),
            &defaults,
            "task",
            1,
            3,
            ConversationId::new(),
            MessageId::new(),
            ToolCallId::new(),
        )
        .unwrap();
        assert_eq!(config.tools, vec!["shell".to_string()]);
    }

    #[test]
    fn template_model_overrides_default() {
        let mut template = template();
        template.model = Some("gpt-4o".to_string());
        let defaults = DelegatingDefaults { model: Some("default-model".to_string()), ..Default::default() };
        let config = SpecialistAgentConfig::materialize(
            &template,
            &defaults,
            "task",
            1,
            3,
            ConversationId::new(),
            MessageId::new(),
            ToolCallId::new(),
        )
        .unwrap();
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
    }
}
