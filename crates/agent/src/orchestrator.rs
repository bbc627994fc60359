//! The conversation orchestrator.
//!
//! [`Orchestrator`] is stateless and shared. Each conversation is a
//! [`ChatSession`] that owns its [`SessionState`] behind an async mutex, so
//! calls on one session run one at a time while sessions proceed in parallel.

use crate::context;
use crate::prompt;
use crate::reply::{ModelReply, Utterance};
use crate::response::{ChoiceOption, NormalizedResponse};
use crate::session::{DEFAULT_HISTORY_LIMIT, Mode, SessionState};
use std::sync::Arc;
use tensive_config::AppConfig;
use tensive_core::error::ToolError;
use tensive_core::message::Message;
use tensive_core::provider::{Provider, ProviderRequest};
use tensive_core::tool::{ToolCall, ToolOutput, ToolRegistry};
use tensive_knowledge::{KnowledgeStore, RetrievalPolicy};
use tensive_tools::{
    CalculationError, CalculatorField, NextStep, RepairType, calculate_spot_repair, get_next_step,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Returned when the model call fails.
pub const CONNECTION_APOLOGY: &str =
    "I'm having trouble connecting to the AI service. Please check your internet connection.";

/// Returned when the model asked for a tool with arguments that do not validate.
pub const RESTATE_REQUEST: &str = "I couldn't make sense of that. Could you restate your request? \
     For an estimate, give the length and width of the area in feet and how many patches.";

/// Text accompanying a guided-estimator manifest.
pub const GUIDED_RESULT: &str = "Based on your inputs, here is the estimated material manifest:";

/// Stateless conversation engine shared by all sessions.
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    knowledge: Arc<KnowledgeStore>,
    policy: RetrievalPolicy,
    history_limit: usize,
    system_prompt: String,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in tools, default retrieval
    /// thresholds and the default system prompt.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        knowledge: Arc<KnowledgeStore>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            tools: Arc::new(tensive_tools::default_registry()),
            knowledge,
            policy: RetrievalPolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            system_prompt: prompt::system_prompt(),
        }
    }

    /// Create an orchestrator from application configuration.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        knowledge: Arc<KnowledgeStore>,
    ) -> Self {
        let mut orchestrator = Self::new(provider, config.effective_model(), knowledge)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_history_limit(config.conversation.history_limit)
            .with_policy(RetrievalPolicy {
                see_also_limit: config.retrieval.see_also_limit,
                content_threshold: config.retrieval.content_threshold,
                asset_threshold: config.retrieval.asset_threshold,
            });
        if let Some(prompt) = &config.assistant.system_prompt_override {
            orchestrator = orchestrator.with_system_prompt(prompt.clone());
        }
        orchestrator
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_policy(mut self, policy: RetrievalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the history window for new sessions.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    pub fn policy(&self) -> RetrievalPolicy {
        self.policy
    }

    /// A fresh session state sized to this orchestrator's window.
    pub fn new_state(&self) -> SessionState {
        SessionState::new(self.history_limit)
    }

    /// Handle one user turn.
    ///
    /// Never fails: transport and dispatch failures become fixed text
    /// responses. History keeps the user turn, plus the assistant turn when
    /// the model answered.
    pub async fn process_message(
        &self,
        state: &mut SessionState,
        utterance: Utterance,
    ) -> NormalizedResponse {
        let query = utterance.query();
        let ranking = self.knowledge.rank(query);
        let retrieval = self.policy.select(&ranking);
        if let Some(g) = &retrieval.grounding {
            debug!(
                title = %g.entry.title,
                score = g.score,
                assets_released = g.assets_released,
                "Knowledge entry injected"
            );
        }

        state.push(utterance.to_message());

        let mut messages = Vec::with_capacity(state.history_len() + 1);
        messages.push(Message::system(format!(
            "{}{}",
            self.system_prompt,
            context::render(&retrieval)
        )));
        messages.extend(state.history().cloned());

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: self.tools.definitions(),
        };

        info!(
            provider = self.provider.name(),
            history = state.history_len(),
            has_image = utterance.image().is_some(),
            "Processing message"
        );

        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Model call failed");
                return NormalizedResponse::text(CONNECTION_APOLOGY);
            }
        };

        let reply = ModelReply::from(&response.message);
        state.push(Message::assistant(response.message.content.clone()));

        match reply {
            ModelReply::ToolInvocation {
                call,
                content,
                ignored,
            } => {
                if ignored > 0 {
                    debug!(tool = %call.name, ignored, "Acting on the first tool call only");
                }
                if self.tools.get(&call.name).is_none() {
                    warn!(tool = %call.name, "Model called an unknown tool; using its text");
                    return NormalizedResponse::Text {
                        text: content,
                        options: vec![],
                        assets: retrieval.released_assets().cloned(),
                    };
                }
                self.dispatch(&call).await
            }
            ModelReply::PlainText(text) => NormalizedResponse::Text {
                text,
                options: vec![],
                assets: retrieval.released_assets().cloned(),
            },
        }
    }

    async fn dispatch(&self, raw: &tensive_core::MessageToolCall) -> NormalizedResponse {
        let result = match ToolCall::try_from(raw) {
            Ok(call) => self.tools.execute(&call).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(ToolOutput::SpotRepair {
                length,
                width,
                count,
                manifest,
            }) => {
                debug!(total_area = manifest.total_area, "Tool produced manifest");
                NormalizedResponse::CalculationResult {
                    text: format!(
                        "I've calculated the materials for a {length}' x {width}' patch ({count} count)."
                    ),
                    data: manifest,
                }
            }
            Ok(ToolOutput::NextSteps { message, options }) => NormalizedResponse::Text {
                text: message,
                options: options.into_iter().map(ChoiceOption::label).collect(),
                assets: None,
            },
            Err(e @ ToolError::InvalidArguments { .. }) => {
                warn!(tool = %raw.name, error = %e, "Rejected tool arguments");
                NormalizedResponse::text(RESTATE_REQUEST)
            }
            Err(e) => {
                warn!(tool = %raw.name, error = %e, "Tool dispatch failed");
                NormalizedResponse::text(CONNECTION_APOLOGY)
            }
        }
    }

    /// Feed free text into the guided estimator.
    ///
    /// Text that does not answer the pending question fills nothing, and
    /// the same question is asked again.
    pub fn advance_calculator(&self, state: &mut SessionState, input: &str) -> NormalizedResponse {
        state.mode = Mode::Calculator;
        if let Some(field) = state.calculator.absorb(input) {
            debug!(?field, "Calculator field filled from text");
        }
        self.calculator_step(state)
    }

    /// Apply a structured selection to the guided estimator.
    pub fn update_calculator(
        &self,
        state: &mut SessionState,
        field: CalculatorField,
    ) -> Result<NormalizedResponse, CalculationError> {
        state.mode = Mode::Calculator;
        state.calculator.apply(field)?;
        Ok(self.calculator_step(state))
    }

    fn calculator_step(&self, state: &mut SessionState) -> NormalizedResponse {
        match get_next_step(&state.calculator) {
            NextStep::Question {
                prompt,
                options,
                input,
            } => NormalizedResponse::Question {
                text: prompt,
                options: options
                    .into_iter()
                    .map(|o| ChoiceOption {
                        label: o.label,
                        value: Some(o.value),
                    })
                    .collect(),
                input,
            },
            NextStep::Complete => {
                let input = state.calculator.clone();
                state.reset_calculator();

                match (input.repair_type, input.dimensions, input.count) {
                    (Some(RepairType::SpotRepair), Some(dims), Some(count)) => {
                        match calculate_spot_repair(dims.length(), dims.width(), count) {
                            Ok(manifest) => NormalizedResponse::CalculationResult {
                                text: GUIDED_RESULT.into(),
                                data: manifest,
                            },
                            Err(e) => {
                                warn!(error = %e, "Guided calculation failed");
                                NormalizedResponse::text(RESTATE_REQUEST)
                            }
                        }
                    }
                    (Some(other), ..) => NormalizedResponse::text(format!(
                        "The guided estimator covers spot repairs only. Tell me about your {} \
                         job and I'll help you plan it.",
                        other.label().to_lowercase()
                    )),
                    (None, ..) => NormalizedResponse::text(RESTATE_REQUEST),
                }
            }
        }
    }
}

/// One conversation. Calls are serialized on the session's state.
pub struct ChatSession {
    id: String,
    orchestrator: Arc<Orchestrator>,
    state: Mutex<SessionState>,
}

impl ChatSession {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self::with_id(orchestrator, uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(orchestrator: Arc<Orchestrator>, id: impl Into<String>) -> Self {
        let state = orchestrator.new_state();
        Self {
            id: id.into(),
            orchestrator,
            state: Mutex::new(state),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn process_message(&self, utterance: Utterance) -> NormalizedResponse {
        let mut state = self.state.lock().await;
        self.orchestrator.process_message(&mut state, utterance).await
    }

    /// Reset history, mode and calculator state. Idempotent.
    pub async fn clear_history(&self) {
        self.state.lock().await.clear();
        debug!(session = %self.id, "Session cleared");
    }

    pub async fn advance_calculator(&self, input: &str) -> NormalizedResponse {
        let mut state = self.state.lock().await;
        self.orchestrator.advance_calculator(&mut state, input)
    }

    pub async fn update_calculator(
        &self,
        field: CalculatorField,
    ) -> Result<NormalizedResponse, CalculationError> {
        let mut state = self.state.lock().await;
        self.orchestrator.update_calculator(&mut state, field)
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }
}
