//! `AgentTemplate`: declarative configuration for a specialist sub-agent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RegistryError, RegistryResult};

/// Declarative configuration for a specialist sub-agent, loaded from a
/// persistence port (one YAML file per agent, in the reference layout).
/// Only `system_prompt` is required; everything else falls back to the
/// delegating conversation's defaults when a template omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTemplate {
    /// Identifier this template is registered under. Optional in the YAML
    /// file itself — [`AgentTemplate::with_id`] fills it in from the
    /// filename when the document omits it.
    #[serde(default)]
    pub id: Option<String>,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Short description of the agent's purpose.
    #[serde(default)]
    pub description: Option<String>,
    /// The system prompt this agent runs with. The only required field.
    pub system_prompt: String,
    /// Tool names this agent is permitted to call. Empty means "inherit
    /// the delegating conversation's tool set".
    #[serde(default)]
    pub tools: Vec<String>,
    /// LLM provider override.
    #[serde(default)]
    pub provider: Option<String>,
    /// Model override.
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature override.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Max output tokens override.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling override.
    #[serde(default)]
    pub top_p: Option<f32>,
    /// Wall-clock budget override for the child run.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Whether the child shares the parent's conversation context instead
    /// of starting from a blank history.
    #[serde(default)]
    pub share_context: Option<bool>,
    /// Free-form metadata carried through to delegation events.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl AgentTemplate {
    /// Parse a template from a YAML document, requiring `systemPrompt`.
    pub fn from_yaml(yaml: &str) -> RegistryResult<Self> {
        serde_yaml::from_str(yaml).map_err(RegistryError::Yaml)
    }

    /// Return a copy with `id` set, if it was not already present in the
    /// source document (the filename wins only when the document is silent).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        if self.id.is_none() {
            self.id = Some(id.into());
        }
        self
    }

    /// The effective id: the document's own id, or `"unnamed"` if neither
    /// the document nor a filename supplied one.
    #[must_use]
    pub fn id_or_default(&self) -> &str {
        self.id.as_deref().unwrap_or("unnamed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_is_the_only_required_field() {
        let template = AgentTemplate::from_yaml("systemPrompt: You are a reviewer.\n").unwrap();
        assert_eq!(template.system_prompt, "You are a reviewer.");
        assert!(template.tools.is_empty());
        assert!(template.id.is_none());
    }

    #[test]
    fn missing_system_prompt_is_rejected() {
        let result = AgentTemplate::from_yaml("name: reviewer\n");
        assert!(result.is_err());
    }

    #[test]
    fn with_id_only_fills_in_when_absent() {
        let template = AgentTemplate::from_yaml("systemPrompt: hi\n").unwrap().with_id("reviewer");
        assert_eq!(template.id.as_deref(), Some("reviewer"));

        let explicit = AgentTemplate::from_yaml("id: custom\nsystemPrompt: hi\n").unwrap().with_id("reviewer");
        assert_eq!(explicit.id.as_deref(), Some("custom"));
    }

    #[test]
    fn full_template_round_trips_through_yaml() {
        let yaml = "\
id: reviewer
name: Code Reviewer
description: Reviews pull requests
systemPrompt: Review the diff for correctness.
tools: [read_file, grep]
model: gpt-4o
temperature: 0.2
maxTokens: 4096
topP: 0.9
timeoutMs: 60000
shareContext: true
metadata:
  team: platform
";
        let template = AgentTemplate::from_yaml(yaml).unwrap();
        assert_eq!(template.name.as_deref(), Some("Code Reviewer"));
        assert_eq!(template.tools, vec!["read_file".to_string(), "grep".to_string()]);
        assert_eq!(template.max_tokens, Some(4096));
        assert_eq!(template.share_context, Some(true));
        assert_eq!(template.metadata.get("team").and_then(Value::as_str), Some("platform"));
    }
}
