pub mod dispatcher;
mod invocation;
pub mod knowledge_tool;
mod tool;
pub mod weather_tool;
pub mod web_search_tool;

pub use dispatcher::ToolDispatcher;
pub use invocation::{ToolRequest, ToolResult, ToolStatus};
pub use knowledge_tool::{KnowledgeDocument, KnowledgeLookupTool};
pub use tool::{FunctionDescriptor, LlmTool, ToolArguments, ToolDescriptor, ToolName};
pub use weather_tool::WeatherTool;
pub use web_search_tool::WebSearchTool;
