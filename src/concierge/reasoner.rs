use crate::concierge::turn::ConversationTurn;
use crate::error::Result;
use crate::llm::tools::ToolRequest;
use async_trait::async_trait;

/// What the reasoning component wants to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// The final reply for the user.
    Reply(String),
    /// Run these tools and come back with the results.
    UseTools(Vec<ToolRequest>),
}

/// The decision maker behind a turn.
///
/// Implementations see the whole turn so far (user text, prior turns, every tool
/// exchange) and either answer or ask for tools. An `Err` means the reasoning
/// component itself is unavailable and ends the turn.
#[async_trait]
pub trait ReasoningComponent: Send + Sync {
    async fn propose_next_step(&self, turn: &ConversationTurn) -> Result<NextStep>;
}

pub const SYSTEM_PROMPT: &str = "You are a knowledgeable and friendly wine concierge for Napa Valley Premium Winery.
Your role is to help customers with information about:
1. Our wines, prices, and tasting notes
2. Tasting room hours and reservations
3. Events and experiences
4. Current weather in Napa Valley
5. General wine knowledge and recommendations
6. Current wine-related news through web search

Always be helpful, professional, and enthusiastic about wine. Be conversational and engaging,
as if you're a sommelier helping customers in person.

Use the knowledge_lookup tool for anything about the winery itself, weather_lookup for weather,
and web_search for news or anything current. If a tool fails, tell the customer you couldn't
fetch that information right now instead of guessing.";
