//! The bounded reasoning/tool loop behind every conversational turn.

use crate::concierge::reasoner::{NextStep, ReasoningComponent};
use crate::concierge::turn::{ConversationTurn, PriorTurn};
use crate::llm::tools::{ToolDispatcher, ToolRequest, ToolResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const UNAVAILABLE_REPLY: &str = "I apologize, but I'm having trouble processing your request right now. Please try again in a moment.";
pub const EXHAUSTED_REPLY: &str = "I'm sorry, I wasn't able to put together a complete answer just now. Could you rephrase your question or ask me again?";

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Answered,
    ToolLoopExhausted,
    ReasoningUnavailable,
}

#[derive(Debug, Clone)]
pub struct TurnReply {
    pub text: String,
    pub outcome: TurnOutcome,
    /// Tool batches executed during the turn
    pub iterations: usize,
    pub tool_results: Vec<ToolResult>,
}

enum TurnState {
    AwaitingReasoning,
    AwaitingToolResults(Vec<ToolRequest>),
    Terminal(String, TurnOutcome),
}

pub struct TurnOrchestrator {
    reasoner: Arc<dyn ReasoningComponent>,
    dispatcher: Arc<ToolDispatcher>,
    max_tool_iterations: usize,
}

impl TurnOrchestrator {
    pub fn new(
        reasoner: Arc<dyn ReasoningComponent>,
        dispatcher: Arc<ToolDispatcher>,
        max_tool_iterations: usize,
    ) -> Self {
        Self {
            reasoner,
            dispatcher,
            max_tool_iterations,
        }
    }

    pub fn max_tool_iterations(&self) -> usize {
        self.max_tool_iterations
    }

    /// Run one turn to completion.
    ///
    /// Never fails: tool failures go back to the reasoner, a reasoner failure yields
    /// [`UNAVAILABLE_REPLY`], and hitting the iteration cap yields [`EXHAUSTED_REPLY`].
    pub async fn handle_turn(&self, user_text: &str, prior_turns: Vec<PriorTurn>) -> TurnReply {
        let mut turn = ConversationTurn::new(user_text, prior_turns);
        let mut iterations = 0;
        let mut state = TurnState::AwaitingReasoning;

        info!(turn_id = %turn.id(), prior_turns = turn.prior_turns().len(), "Turn started");

        let (text, outcome) = loop {
            state = match state {
                TurnState::AwaitingReasoning => match self.reasoner.propose_next_step(&turn).await {
                    Ok(NextStep::Reply(text)) => TurnState::Terminal(text, TurnOutcome::Answered),
                    Ok(NextStep::UseTools(requests)) if requests.is_empty() => {
                        warn!(turn_id = %turn.id(), "Reasoner asked for an empty tool batch");
                        TurnState::Terminal(
                            UNAVAILABLE_REPLY.to_string(),
                            TurnOutcome::ReasoningUnavailable,
                        )
                    }
                    Ok(NextStep::UseTools(_)) if iterations >= self.max_tool_iterations => {
                        warn!(
                            turn_id = %turn.id(),
                            iterations = iterations,
                            "Tool loop cap reached without a reply"
                        );
                        TurnState::Terminal(
                            EXHAUSTED_REPLY.to_string(),
                            TurnOutcome::ToolLoopExhausted,
                        )
                    }
                    Ok(NextStep::UseTools(requests)) => TurnState::AwaitingToolResults(requests),
                    Err(e) => {
                        warn!(turn_id = %turn.id(), error = %e, "Reasoning component failed");
                        TurnState::Terminal(
                            UNAVAILABLE_REPLY.to_string(),
                            TurnOutcome::ReasoningUnavailable,
                        )
                    }
                },
                TurnState::AwaitingToolResults(requests) => {
                    iterations += 1;
                    info!(
                        turn_id = %turn.id(),
                        iteration = iterations,
                        tools = requests.len(),
                        "Dispatching tool batch"
                    );
                    let results = self.dispatcher.execute_all(&requests).await;
                    turn.record_exchange(requests, results);
                    TurnState::AwaitingReasoning
                }
                TurnState::Terminal(text, outcome) => break (text, outcome),
            };
        };

        info!(turn_id = %turn.id(), outcome = ?outcome, iterations = iterations, "Turn finished");

        TurnReply {
            text,
            outcome,
            iterations,
            tool_results: turn.into_tool_results(),
        }
    }
}
