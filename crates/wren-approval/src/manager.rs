//! Per-conversation approval manager: consults the injected hook, and
//! remembers `allow_session` decisions so the same tool isn't re-prompted
//! within one conversation.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use wren_core::{CancelToken, ConversationId};

use crate::decision::ApprovalDecision;
use crate::error::ApprovalResult;
use crate::hook::ApprovalHook;
use crate::request::ApprovalRequest;

/// Gates tool execution behind an [`ApprovalHook`], maintaining a
/// per-conversation allow set so `allow_session` decisions aren't
/// re-prompted for the rest of that conversation.
pub struct ApprovalManager {
    hook: Arc<dyn ApprovalHook>,
    allow_sets: DashMap<ConversationId, HashSet<String>>,
}

impl ApprovalManager {
    /// Build a manager around `hook`.
    #[must_use]
    pub fn new(hook: Arc<dyn ApprovalHook>) -> Self {
        Self {
            hook,
            allow_sets: DashMap::new(),
        }
    }

    /// Decide whether `request` may proceed.
    ///
    /// If `request.tool_name` was previously approved with
    /// [`ApprovalDecision::AllowSession`] in this conversation, returns
    /// [`ApprovalDecision::AllowOnce`] without consulting the hook again.
    /// Otherwise consults the hook, and records the tool name in the
    /// conversation's allow set if the decision was `allow_session`.
    pub async fn consult(
        &self,
        request: &ApprovalRequest,
        cancel: &CancelToken,
    ) -> ApprovalResult<ApprovalDecision> {
        if self.is_pre_approved(&request.conversation_id, &request.tool_name) {
            debug!(
                tool = %request.tool_name,
                conversation = %request.conversation_id,
                "tool pre-approved for this conversation"
            );
            return Ok(ApprovalDecision::AllowOnce);
        }

        let decision = self.hook.decide(request, cancel).await?;
        if decision.persists_for_session() {
            self.allow_sets
                .entry(request.conversation_id.clone())
                .or_default()
                .insert(request.tool_name.clone());
        }
        Ok(decision)
    }

    /// Whether `tool_name` was already approved for the rest of `conversation_id`.
    #[must_use]
    pub fn is_pre_approved(&self, conversation_id: &ConversationId, tool_name: &str) -> bool {
        self.allow_sets
            .get(conversation_id)
            .is_some_and(|set| set.contains(tool_name))
    }

    /// Drop the allow set for a finished conversation.
    pub fn clear_conversation(&self, conversation_id: &ConversationId) {
        self.allow_sets.remove(conversation_id);
    }
}
