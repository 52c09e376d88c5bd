//! Adapter for converting LLM messages to and from the OpenAI chat format.

use crate::llm::models::{LlmMessage, LlmToolCall, MessageRole};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::warn;

/// Adapt LLM messages to OpenAI format.
pub fn adapt_messages_to_openai(messages: &[LlmMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|msg| match msg.role {
            MessageRole::System => json!({
                "role": "system",
                "content": msg.content.as_deref().unwrap_or("")
            }),
            MessageRole::User => json!({
                "role": "user",
                "content": msg.content.as_deref().unwrap_or("")
            }),
            MessageRole::Assistant => {
                let mut assistant_msg = json!({ "role": "assistant" });

                // OpenAI wants an explicit null content alongside tool calls
                assistant_msg["content"] = match msg.content {
                    Some(ref content) => json!(content),
                    None => Value::Null,
                };

                if let Some(ref tool_calls) = msg.tool_calls {
                    let formatted_calls: Vec<Value> = tool_calls
                        .iter()
                        .map(|tc| {
                            json!({
                                "id": tc.id.as_deref().unwrap_or(""),
                                "type": "function",
                                "function": {
                                    "name": tc.name,
                                    "arguments": serde_json::to_string(&tc.arguments).unwrap_or_default()
                                }
                            })
                        })
                        .collect();
                    assistant_msg["tool_calls"] = json!(formatted_calls);
                }

                assistant_msg
            }
            MessageRole::Tool => json!({
                "role": "tool",
                "content": msg.content.as_deref().unwrap_or(""),
                "tool_call_id": msg.tool_call_id.as_deref().unwrap_or("")
            }),
        })
        .collect()
}

/// Convert tool calls from OpenAI format to internal format.
///
/// Calls without a function name are dropped. Arguments that are not a JSON object
/// are logged and replaced by an empty map so the tool sees them as missing.
pub fn convert_tool_calls(tool_calls: &[Value]) -> Vec<LlmToolCall> {
    tool_calls
        .iter()
        .filter_map(|tc| {
            let id = tc["id"].as_str().map(String::from);
            let name = tc["function"]["name"].as_str()?.to_string();
            let args_str = tc["function"]["arguments"].as_str().unwrap_or("{}");

            let arguments: HashMap<String, Value> = serde_json::from_str(args_str)
                .unwrap_or_else(|e| {
                    warn!(tool = %name, error = %e, "Unparsable tool call arguments");
                    HashMap::new()
                });

            Some(LlmToolCall {
                id,
                name,
                arguments,
            })
        })
        .collect()
}
