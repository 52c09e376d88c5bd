use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message role in LLM conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Tool call from LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmToolCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub arguments: HashMap<String, serde_json::Value>,
}

/// Message in LLM conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    #[serde(default = "default_role")]
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<LlmToolCall>>,
    /// Id of the tool call a `Tool` message answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

fn default_role() -> MessageRole {
    MessageRole::User
}

/// Response from LLM gateway
#[derive(Debug, Clone, Default)]
pub struct LlmGatewayResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<LlmToolCall>,
}

impl LlmMessage {
    fn with_role(role: MessageRole, content: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, Some(content.into()))
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, Some(content.into()))
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, Some(content.into()))
    }

    /// Create an assistant message that requests tool calls
    pub fn assistant_tool_calls(tool_calls: Vec<LlmToolCall>) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Self::with_role(MessageRole::Assistant, None)
        }
    }

    /// Create a tool message answering the call with `tool_call_id`
    pub fn tool(tool_call_id: Option<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id,
            ..Self::with_role(MessageRole::Tool, Some(content.into()))
        }
    }
}
