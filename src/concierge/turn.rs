use crate::llm::tools::{ToolRequest, ToolResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One earlier utterance the caller resends with a new turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl PriorTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// A batch of tool requests the reasoner issued together, with their results.
#[derive(Debug, Clone)]
pub struct ToolExchange {
    pub requests: Vec<ToolRequest>,
    pub results: Vec<ToolResult>,
}

/// Everything known about the turn in progress.
///
/// Owned by the orchestrator for the length of one turn and dropped once the reply is
/// produced.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    id: Uuid,
    user_text: String,
    prior_turns: Vec<PriorTurn>,
    exchanges: Vec<ToolExchange>,
}

impl ConversationTurn {
    pub fn new(user_text: impl Into<String>, prior_turns: Vec<PriorTurn>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_text: user_text.into(),
            prior_turns,
            exchanges: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn prior_turns(&self) -> &[PriorTurn] {
        &self.prior_turns
    }

    pub fn exchanges(&self) -> &[ToolExchange] {
        &self.exchanges
    }

    /// Every tool result of this turn, in the order they were produced.
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.exchanges.iter().flat_map(|e| e.results.iter())
    }

    pub fn record_exchange(&mut self, requests: Vec<ToolRequest>, results: Vec<ToolResult>) {
        self.exchanges.push(ToolExchange { requests, results });
    }

    pub(crate) fn into_tool_results(self) -> Vec<ToolResult> {
        self.exchanges.into_iter().flat_map(|e| e.results).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_turn_is_empty() {
        let turn = ConversationTurn::new("Hello", vec![PriorTurn::user("Hi"), PriorTurn::assistant("Welcome!")]);

        assert_eq!(turn.user_text(), "Hello");
        assert_eq!(turn.prior_turns().len(), 2);
        assert_eq!(turn.tool_results().count(), 0);
    }

    #[test]
    fn test_turns_get_distinct_ids() {
        let a = ConversationTurn::new("Hello", vec![]);
        let b = ConversationTurn::new("Hello", vec![]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_tool_results_flatten_in_order() {
        let mut turn = ConversationTurn::new("Weather and news?", vec![]);
        let first = ToolRequest::new("weather_lookup").with_id("1");
        let second = ToolRequest::new("web_search").with_id("2");
        let third = ToolRequest::new("knowledge_lookup").with_id("3");

        turn.record_exchange(
            vec![first.clone(), second.clone()],
            vec![ToolResult::success(&first, "sunny"), ToolResult::failure(&second, "500")],
        );
        turn.record_exchange(vec![third.clone()], vec![ToolResult::success(&third, "hours")]);

        let ids: Vec<_> = turn.tool_results().map(|r| r.call_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(turn.exchanges().len(), 2);
        assert_eq!(turn.into_tool_results().len(), 3);
    }

    #[test]
    fn test_prior_turn_serialization() {
        let json = serde_json::to_string(&PriorTurn::assistant("Cheers")).unwrap();
        assert_eq!(json, r#"{"speaker":"assistant","text":"Cheers"}"#);
    }
}
