use crate::llm::models::LlmToolCall;
use crate::llm::tools::ToolArguments;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation chosen by the reasoning component.
///
/// `name` is kept as the raw string the reasoner produced; the dispatcher decides
/// whether it names a real tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: ToolArguments,
}

impl ToolRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments: ToolArguments::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Convert back into the model's tool call shape.
    pub fn to_tool_call(&self) -> LlmToolCall {
        LlmToolCall {
            id: self.id.clone(),
            name: self.name.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        }
    }
}

impl From<LlmToolCall> for ToolRequest {
    /// JSON strings are taken as-is, other values keep their JSON rendering and
    /// nulls are dropped.
    fn from(call: LlmToolCall) -> Self {
        let arguments = call
            .arguments
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();

        Self {
            id: call.id,
            name: call.name,
            arguments,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Failure,
}

/// Outcome of exactly one [`ToolRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    pub status: ToolStatus,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ToolResult {
    pub fn success(request: &ToolRequest, text: impl Into<String>) -> Self {
        Self {
            tool: request.name.clone(),
            call_id: request.id.clone(),
            status: ToolStatus::Success,
            text: text.into(),
            error_detail: None,
        }
    }

    pub fn failure(request: &ToolRequest, detail: impl Into<String>) -> Self {
        Self {
            tool: request.name.clone(),
            call_id: request.id.clone(),
            status: ToolStatus::Failure,
            text: String::new(),
            error_detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }

    /// Text handed back to the reasoning component.
    pub fn model_content(&self) -> String {
        match self.status {
            ToolStatus::Success => self.text.clone(),
            ToolStatus::Failure => format!(
                "The {} tool failed: {}",
                self.tool,
                self.error_detail.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
