//! Conversation turns: the reasoning component seam, its two implementations, and the
//! orchestrator running the tool loop between them and the dispatcher.

pub mod keyword_reasoner;
pub mod llm_reasoner;
pub mod orchestrator;
pub mod reasoner;
pub mod turn;

pub use keyword_reasoner::KeywordReasoner;
pub use llm_reasoner::LlmReasoner;
pub use orchestrator::{TurnOrchestrator, TurnOutcome, TurnReply};
pub use reasoner::{NextStep, ReasoningComponent};
pub use turn::{ConversationTurn, PriorTurn, Speaker};

use crate::config::{ConciergeConfig, RoutingMode};
use crate::error::Result;
use crate::llm::gateways::{OpenAIConfig, OpenAIGateway};
use crate::llm::tools::{
    KnowledgeDocument, KnowledgeLookupTool, LlmTool, ToolDispatcher, WeatherTool, WebSearchTool,
};
use crate::llm::{CompletionConfig, LlmGateway};
use std::sync::Arc;
use tracing::info;

/// Everything a transport needs to serve turns, assembled once at startup.
pub struct Concierge {
    orchestrator: TurnOrchestrator,
    dispatcher: Arc<ToolDispatcher>,
    knowledge: Arc<KnowledgeDocument>,
    reasoning_credential_present: bool,
}

impl Concierge {
    pub fn new(
        orchestrator: TurnOrchestrator,
        dispatcher: Arc<ToolDispatcher>,
        knowledge: Arc<KnowledgeDocument>,
        reasoning_credential_present: bool,
    ) -> Self {
        Self {
            orchestrator,
            dispatcher,
            knowledge,
            reasoning_credential_present,
        }
    }

    /// Load the knowledge document, build the tools, the gateway, and the configured
    /// reasoner. Fails on any configuration problem.
    pub fn from_config(config: &ConciergeConfig) -> Result<Self> {
        let knowledge = Arc::new(KnowledgeDocument::load(&config.tools.knowledge_path)?);

        let weather = WeatherTool::from_settings(&config.tools)?;
        if !weather.has_credentials() {
            info!("OPENWEATHER_API_KEY not set, weather answers will use mock data");
        }

        let tools: Vec<Arc<dyn LlmTool>> = vec![
            Arc::new(KnowledgeLookupTool::new(knowledge.clone())),
            Arc::new(weather),
            Arc::new(WebSearchTool::from_settings(&config.tools)?),
        ];
        let dispatcher = Arc::new(ToolDispatcher::new(tools, config.tools.provider_timeout));

        let settings = &config.reasoning;
        let gateway: Arc<dyn LlmGateway> =
            Arc::new(OpenAIGateway::with_config(OpenAIConfig::from(settings))?);
        let completion = CompletionConfig {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };

        let reasoner: Arc<dyn ReasoningComponent> = match settings.routing {
            RoutingMode::Model => Arc::new(LlmReasoner::new(
                settings.model.clone(),
                gateway,
                dispatcher.descriptors(),
                completion,
            )),
            RoutingMode::Keyword => {
                Arc::new(KeywordReasoner::new(settings.model.clone(), gateway, completion)?)
            }
        };

        info!(
            model = %settings.model,
            routing = ?settings.routing,
            max_tool_iterations = settings.max_tool_iterations,
            "Wine concierge initialized"
        );

        let orchestrator =
            TurnOrchestrator::new(reasoner, dispatcher.clone(), settings.max_tool_iterations);

        Ok(Self::new(orchestrator, dispatcher, knowledge, !settings.api_key.trim().is_empty()))
    }

    pub async fn handle_turn(&self, user_text: &str, prior_turns: Vec<PriorTurn>) -> TurnReply {
        self.orchestrator.handle_turn(user_text, prior_turns).await
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    pub fn knowledge(&self) -> &KnowledgeDocument {
        &self.knowledge
    }

    pub fn reasoning_credential_present(&self) -> bool {
        self.reasoning_credential_present
    }
}
