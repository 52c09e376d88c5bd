//! Routes tool requests from the reasoning component to the registered tools.
//!
//! The dispatcher is the containment boundary for tool failures: whatever goes wrong
//! inside a tool (unknown name, bad arguments, provider error, timeout) comes back as a
//! [`ToolResult`] with failure status. Nothing escapes as an error.

use crate::llm::tools::{LlmTool, ToolDescriptor, ToolName, ToolRequest, ToolResult};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct ToolDispatcher {
    tools: Vec<Arc<dyn LlmTool>>,
    timeout: Duration,
}

impl ToolDispatcher {
    /// `timeout` bounds every single tool run, on top of any client-level timeout
    /// the tool applies itself.
    pub fn new(tools: Vec<Arc<dyn LlmTool>>, timeout: Duration) -> Self {
        Self { tools, timeout }
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    fn find(&self, name: ToolName) -> Option<&Arc<dyn LlmTool>> {
        self.tools.iter().find(|t| t.matches(name))
    }

    /// Execute one request.
    pub async fn execute(&self, request: &ToolRequest) -> ToolResult {
        let name = match request.name.parse::<ToolName>() {
            Ok(name) => name,
            Err(_) => {
                warn!(tool = %request.name, "Reasoner requested an unknown tool");
                return ToolResult::failure(
                    request,
                    format!(
                        "Unknown tool '{}'. Available tools: knowledge_lookup, weather_lookup, web_search",
                        request.name
                    ),
                );
            }
        };

        let Some(tool) = self.find(name) else {
            warn!(tool = %name, "Tool is not registered");
            return ToolResult::failure(request, format!("The {} tool is not available", name));
        };

        info!(tool = %name, "Executing tool");
        match tokio::time::timeout(self.timeout, tool.run(&request.arguments)).await {
            Ok(Ok(text)) => {
                info!(tool = %name, status = "success", bytes = text.len(), "Tool finished");
                ToolResult::success(request, text)
            }
            Ok(Err(e)) => {
                warn!(tool = %name, status = "failure", error = %e, "Tool failed");
                ToolResult::failure(request, e.to_string())
            }
            Err(_) => {
                warn!(tool = %name, status = "failure", timeout_secs = self.timeout.as_secs(), "Tool timed out");
                ToolResult::failure(
                    request,
                    format!("The {} tool did not respond within {}s", name, self.timeout.as_secs()),
                )
            }
        }
    }

    /// Execute a batch concurrently. Results come back in request order.
    pub async fn execute_all(&self, requests: &[ToolRequest]) -> Vec<ToolResult> {
        join_all(requests.iter().map(|request| self.execute(request))).await
    }
}
