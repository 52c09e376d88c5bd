pub mod concierge;
pub mod config;
pub mod error;
pub mod llm;
pub mod server;

pub use error::{ConciergeError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::concierge::{Concierge, PriorTurn, TurnOutcome, TurnReply};
    pub use crate::config::ConciergeConfig;
    pub use crate::error::{ConciergeError, Result};
    pub use crate::llm::gateways::OpenAIGateway;
    pub use crate::llm::tools::{LlmTool, ToolDispatcher, ToolRequest, ToolResult};
    pub use crate::llm::{CompletionConfig, LlmGateway, LlmMessage};
}
