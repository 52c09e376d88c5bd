use crate::error::{ConciergeError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Arguments handed to a tool, already flattened to strings.
pub type ToolArguments = HashMap<String, String>;

/// Descriptor for tool function parameters
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    pub r#type: String,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    pub fn function(name: ToolName, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: name.as_str().to_string(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// The tools the concierge knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    KnowledgeLookup,
    WeatherLookup,
    WebSearch,
}

impl ToolName {
    pub const ALL: [ToolName; 3] =
        [ToolName::KnowledgeLookup, ToolName::WeatherLookup, ToolName::WebSearch];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::KnowledgeLookup => "knowledge_lookup",
            ToolName::WeatherLookup => "weather_lookup",
            ToolName::WebSearch => "web_search",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ConciergeError;

    fn from_str(name: &str) -> Result<Self> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == name)
            .ok_or_else(|| ConciergeError::ToolError(format!("Unknown tool: {}", name)))
    }
}

/// Trait for LLM tools
#[async_trait]
pub trait LlmTool: Send + Sync {
    /// Which tool this is
    fn name(&self) -> ToolName;

    /// Execute the tool with given arguments and return text for the model
    async fn run(&self, args: &ToolArguments) -> Result<String>;

    /// Get tool descriptor for LLM
    fn descriptor(&self) -> ToolDescriptor;

    /// Check if this tool matches the given name
    fn matches(&self, name: ToolName) -> bool {
        self.name() == name
    }
}
