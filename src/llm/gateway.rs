use crate::error::Result;
use crate::llm::models::{LlmGatewayResponse, LlmMessage};
use crate::llm::tools::ToolDescriptor;
use async_trait::async_trait;

/// Configuration for LLM completion
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// Abstract interface for LLM providers
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Complete an LLM request, optionally offering tools the model may call
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        tools: Option<&[ToolDescriptor]>,
        config: &CompletionConfig,
    ) -> Result<LlmGatewayResponse>;
}
