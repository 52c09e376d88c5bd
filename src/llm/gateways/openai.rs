//! OpenAI Gateway for LLM interactions.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint, including tool calling.

use crate::config::ReasoningSettings;
use crate::error::{ConciergeError, Result};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::gateways::openai_messages_adapter::{adapt_messages_to_openai, convert_tool_calls};
use crate::llm::models::{LlmGatewayResponse, LlmMessage};
use crate::llm::tools::ToolDescriptor;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for connecting to OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl From<&ReasoningSettings> for OpenAIConfig {
    fn from(settings: &ReasoningSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            timeout: Some(settings.timeout),
        }
    }
}

/// Gateway for OpenAI LLM service.
pub struct OpenAIGateway {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIGateway {
    /// Create a new OpenAI gateway with custom configuration.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(OpenAIConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: None,
        })
    }

    fn build_body(
        &self,
        model: &str,
        messages: &[LlmMessage],
        tools: Option<&[ToolDescriptor]>,
        config: &CompletionConfig,
    ) -> Result<Value> {
        let mut body = serde_json::json!({
            "model": model,
            "messages": adapt_messages_to_openai(messages),
            "temperature": config.temperature,
            "max_tokens": config.max_tokens,
        });

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            body["tools"] = serde_json::to_value(tools)?;
            body["tool_choice"] = serde_json::json!("auto");
        }

        Ok(body)
    }
}

#[async_trait]
impl LlmGateway for OpenAIGateway {
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        tools: Option<&[ToolDescriptor]>,
        config: &CompletionConfig,
    ) -> Result<LlmGatewayResponse> {
        info!("Delegating to OpenAI for completion");
        debug!("Model: {}, Message count: {}", model, messages.len());

        let body = self.build_body(model, messages, tools, config)?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url.trim_end_matches('/')))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ConciergeError::TimeoutError(format!("OpenAI request timed out: {}", e))
                } else {
                    ConciergeError::HttpError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ConciergeError::GatewayError(format!(
                "OpenAI API error: {} - {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;

        let message = &response_body["choices"][0]["message"];
        if !message.is_object() {
            return Err(ConciergeError::GatewayError(
                "OpenAI response contained no message".to_string(),
            ));
        }

        let content = message["content"].as_str().map(String::from);
        let tool_calls = message["tool_calls"]
            .as_array()
            .map(|calls| convert_tool_calls(calls))
            .unwrap_or_default();

        Ok(LlmGatewayResponse {
            content,
            tool_calls,
        })
    }
}
