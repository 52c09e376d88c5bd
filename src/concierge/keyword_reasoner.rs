use crate::concierge::reasoner::{NextStep, ReasoningComponent, SYSTEM_PROMPT};
use crate::concierge::turn::{ConversationTurn, Speaker};
use crate::error::{ConciergeError, Result};
use crate::llm::tools::weather_tool::DEFAULT_LOCATION;
use crate::llm::tools::{ToolName, ToolRequest, ToolResult};
use crate::llm::{CompletionConfig, LlmGateway, LlmMessage};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

const WINE_WORDS: &[&str] = &[
    "wine", "tasting", "vineyard", "bottle", "price", "hours", "reservation", "event",
    "cabernet", "chardonnay", "merlot", "pinot",
];
const WEATHER_WORDS: &[&str] = &["weather", "temperature", "rain", "sunny", "climate"];
const SEARCH_WORDS: &[&str] = &["news", "latest", "recent", "current", "search", "find", "trend"];

fn keyword_pattern(words: &[&str]) -> Result<Regex> {
    // Prefix match so "wines", "events", "trends" count too
    Regex::new(&format!(r"(?i)\b(?:{})", words.join("|")))
        .map_err(|e| ConciergeError::ConfigError(format!("invalid keyword pattern: {}", e)))
}

/// Reasoner that routes on keywords and only uses the model to phrase the reply.
///
/// The first step always issues exactly one tool request; once results exist the model
/// is asked, without tools, to answer from the gathered context.
pub struct KeywordReasoner {
    model: String,
    gateway: Arc<dyn LlmGateway>,
    config: CompletionConfig,
    wine: Regex,
    weather: Regex,
    search: Regex,
}

impl KeywordReasoner {
    pub fn new(
        model: impl Into<String>,
        gateway: Arc<dyn LlmGateway>,
        config: CompletionConfig,
    ) -> Result<Self> {
        Ok(Self {
            model: model.into(),
            gateway,
            config,
            wine: keyword_pattern(WINE_WORDS)?,
            weather: keyword_pattern(WEATHER_WORDS)?,
            search: keyword_pattern(SEARCH_WORDS)?,
        })
    }

    /// Pick the tool for `user_text`. Wine questions win over weather, weather over
    /// news, and anything else falls back to the knowledge document.
    pub fn classify(&self, user_text: &str) -> ToolRequest {
        let request = if self.wine.is_match(user_text) {
            ToolRequest::new(ToolName::KnowledgeLookup.as_str()).with_argument("query", user_text)
        } else if self.weather.is_match(user_text) {
            ToolRequest::new(ToolName::WeatherLookup.as_str())
                .with_argument("location", DEFAULT_LOCATION)
        } else if self.search.is_match(user_text) {
            ToolRequest::new(ToolName::WebSearch.as_str()).with_argument("query", user_text)
        } else {
            ToolRequest::new(ToolName::KnowledgeLookup.as_str()).with_argument("query", user_text)
        };

        request.with_id("keyword_route_1")
    }

    fn context_label(result: &ToolResult) -> &'static str {
        match result.tool.parse::<ToolName>() {
            Ok(ToolName::KnowledgeLookup) => "Wine Business Information",
            Ok(ToolName::WeatherLookup) => "Weather Information",
            Ok(ToolName::WebSearch) => "Web Search Results",
            Err(_) => "Additional Information",
        }
    }

    pub(crate) fn build_messages(turn: &ConversationTurn) -> Vec<LlmMessage> {
        let context = turn
            .tool_results()
            .map(|r| format!("{}: {}", Self::context_label(r), r.model_content()))
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut messages = vec![LlmMessage::system(SYSTEM_PROMPT)];
        messages.extend(turn.prior_turns().iter().map(|prior| match prior.speaker {
            Speaker::User => LlmMessage::user(&prior.text),
            Speaker::Assistant => LlmMessage::assistant(&prior.text),
        }));
        messages.push(LlmMessage::user(format!(
            "User question: {}\n\nAvailable Information:\n{}\n\n\
             Please provide a helpful, engaging response as a wine concierge. Use the information above if relevant.\n\
             Keep your response conversational and friendly.",
            turn.user_text(),
            context
        )));
        messages
    }
}

#[async_trait]
impl ReasoningComponent for KeywordReasoner {
    async fn propose_next_step(&self, turn: &ConversationTurn) -> Result<NextStep> {
        if turn.exchanges().is_empty() {
            let request = self.classify(turn.user_text());
            debug!(turn_id = %turn.id(), tool = %request.name, "Keyword route chosen");
            return Ok(NextStep::UseTools(vec![request]));
        }

        let messages = Self::build_messages(turn);
        let response = self.gateway.complete(&self.model, &messages, None, &self.config).await?;

        match response.content {
            Some(text) if !text.trim().is_empty() => Ok(NextStep::Reply(text)),
            _ => Err(ConciergeError::GatewayError("model returned an empty reply".to_string())),
        }
    }
}
