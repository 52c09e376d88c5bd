use crate::concierge::reasoner::{NextStep, ReasoningComponent, SYSTEM_PROMPT};
use crate::concierge::turn::{ConversationTurn, Speaker};
use crate::error::{ConciergeError, Result};
use crate::llm::tools::{ToolDescriptor, ToolRequest};
use crate::llm::{CompletionConfig, LlmGateway, LlmMessage};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Reasoner that lets the model pick tools through native tool calling.
pub struct LlmReasoner {
    model: String,
    gateway: Arc<dyn LlmGateway>,
    tools: Vec<ToolDescriptor>,
    config: CompletionConfig,
}

impl LlmReasoner {
    pub fn new(
        model: impl Into<String>,
        gateway: Arc<dyn LlmGateway>,
        tools: Vec<ToolDescriptor>,
        config: CompletionConfig,
    ) -> Self {
        Self {
            model: model.into(),
            gateway,
            tools,
            config,
        }
    }

    /// Replay the turn as a chat transcript.
    pub(crate) fn build_messages(turn: &ConversationTurn) -> Vec<LlmMessage> {
        let mut messages = vec![LlmMessage::system(SYSTEM_PROMPT)];

        messages.extend(turn.prior_turns().iter().map(|prior| match prior.speaker {
            Speaker::User => LlmMessage::user(&prior.text),
            Speaker::Assistant => LlmMessage::assistant(&prior.text),
        }));

        messages.push(LlmMessage::user(turn.user_text()));

        for exchange in turn.exchanges() {
            messages.push(LlmMessage::assistant_tool_calls(
                exchange.requests.iter().map(ToolRequest::to_tool_call).collect(),
            ));
            messages.extend(
                exchange
                    .results
                    .iter()
                    .map(|result| LlmMessage::tool(result.call_id.clone(), result.model_content())),
            );
        }

        messages
    }
}

#[async_trait]
impl ReasoningComponent for LlmReasoner {
    async fn propose_next_step(&self, turn: &ConversationTurn) -> Result<NextStep> {
        let messages = Self::build_messages(turn);
        debug!(turn_id = %turn.id(), messages = messages.len(), "Asking model for next step");

        let response = self
            .gateway
            .complete(&self.model, &messages, Some(self.tools.as_slice()), &self.config)
            .await?;

        if !response.tool_calls.is_empty() {
            return Ok(NextStep::UseTools(
                response.tool_calls.into_iter().map(ToolRequest::from).collect(),
            ));
        }

        match response.content {
            Some(text) if !text.trim().is_empty() => Ok(NextStep::Reply(text)),
            _ => Err(ConciergeError::GatewayError(
                "model returned neither a reply nor tool calls".to_string(),
            )),
        }
    }
}
