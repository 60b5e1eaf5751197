use std::sync::Arc;

use kfzroute_core::domain::chat::{new_completion_id, CLARIFICATION_REPLY, NOT_FOUND_REPLY};
use kfzroute_core::{
    ApplicationError, ChatCompletionRequest, CompletionResponse, InterfaceError, PipelineEngine,
    PipelineEvent, PipelineState, TransitionOutcome, Usage,
};
use kfzroute_store::{CaseResolver, DataStore, IntentIndexRepository};
use serde_json::Value;
use tracing::{error, info};

use crate::classifier::IntentClassifier;
use crate::llm::LanguageModel;
use crate::renderer::ResponseRenderer;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Completion(CompletionResponse),
    Failure(InterfaceError),
}

/// Everything one request produced: the reply and the transitions taken.
#[derive(Clone, Debug)]
pub struct PipelineRun {
    pub correlation_id: String,
    pub transitions: Vec<TransitionOutcome>,
    pub reply: Reply,
}

impl PipelineRun {
    pub fn final_state(&self) -> PipelineState {
        self.transitions.last().map(|outcome| outcome.to).unwrap_or(PipelineState::ReceiveRequest)
    }

    pub fn status_code(&self) -> u16 {
        self.transitions.last().and_then(TransitionOutcome::status_code).unwrap_or(500)
    }

    pub fn visited(&self, state: PipelineState) -> bool {
        self.transitions.iter().any(|outcome| outcome.to == state)
    }
}

/// Runs classify → resolve → render for one chat-completion body. Holds no
/// per-request state; clients are injected and shared.
#[derive(Clone)]
pub struct RouterRuntime {
    engine: PipelineEngine,
    classifier: IntentClassifier,
    resolver: CaseResolver,
    renderer: ResponseRenderer,
    model: String,
}

struct Walk {
    engine: PipelineEngine,
    state: PipelineState,
    transitions: Vec<TransitionOutcome>,
}

impl Walk {
    fn new(engine: PipelineEngine) -> Self {
        Self { engine, state: engine.initial_state(), transitions: Vec::new() }
    }

    fn step(&mut self, event: PipelineEvent) -> Result<(), ApplicationError> {
        let outcome = self
            .engine
            .apply(self.state, event)
            .map_err(|error| ApplicationError::Internal(error.to_string()))?;
        self.state = outcome.to;
        self.transitions.push(outcome);
        Ok(())
    }
}

impl RouterRuntime {
    pub fn new(store: Arc<dyn DataStore>, llm: Arc<dyn LanguageModel>) -> Self {
        let model = llm.model().to_string();
        Self {
            engine: PipelineEngine::new(),
            classifier: IntentClassifier::new(IntentIndexRepository::new(store.clone()), llm.clone()),
            resolver: CaseResolver::new(store),
            renderer: ResponseRenderer::new(llm),
            model,
        }
    }

    pub async fn handle(&self, body: &Value) -> PipelineRun {
        let correlation_id = new_completion_id();
        let mut walk = Walk::new(self.engine);

        let reply = match self.drive(&mut walk, body, &correlation_id).await {
            Ok(response) => Reply::Completion(response),
            Err(failure) => {
                let event = match &failure {
                    ApplicationError::Validation(_) => PipelineEvent::InputRejected,
                    _ => PipelineEvent::StageFailed,
                };
                if let Err(transition_error) = walk.step(event) {
                    error!(
                        event_name = "pipeline.transition.invalid",
                        correlation_id = %correlation_id,
                        error = %transition_error,
                        "could not record failure transition"
                    );
                }
                error!(
                    event_name = "pipeline.request.failed",
                    correlation_id = %correlation_id,
                    state = ?walk.state,
                    error = %failure,
                    "chat completion request failed"
                );
                Reply::Failure(failure.into_interface(correlation_id.clone()))
            }
        };

        PipelineRun { correlation_id, transitions: walk.transitions, reply }
    }

    async fn drive(
        &self,
        walk: &mut Walk,
        body: &Value,
        correlation_id: &str,
    ) -> Result<CompletionResponse, ApplicationError> {
        walk.step(PipelineEvent::RequestReceived)?;
        let request = ChatCompletionRequest::from_value(body)?;
        walk.step(PipelineEvent::InputAccepted)?;

        info!(
            event_name = "pipeline.request.accepted",
            correlation_id,
            user_message = %request.user_message,
            mode = request.mode.as_str(),
            "user message received"
        );

        let Some(slug) = self.classifier.extract_intent(&request.user_message).await? else {
            info!(event_name = "pipeline.intent.unknown", correlation_id, "no intent matched");
            walk.step(PipelineEvent::IntentUnmatched)?;
            walk.step(PipelineEvent::ReplyComposed)?;
            return Ok(self.envelope(correlation_id, CLARIFICATION_REPLY, Usage::zero()));
        };
        walk.step(PipelineEvent::IntentMatched)?;

        let Some(record) = self.resolver.resolve(&slug).await? else {
            info!(
                event_name = "pipeline.case.missing",
                correlation_id,
                intent = %slug,
                "no active case record"
            );
            walk.step(PipelineEvent::CaseMissing)?;
            walk.step(PipelineEvent::ReplyComposed)?;
            return Ok(self.envelope(correlation_id, NOT_FOUND_REPLY, Usage::zero()));
        };
        walk.step(PipelineEvent::CaseFound)?;

        let content =
            self.renderer.render(&request.user_message, &slug, &record, request.mode).await?;
        walk.step(PipelineEvent::ResponseRendered)?;

        info!(
            event_name = "pipeline.response.rendered",
            correlation_id,
            intent = %slug,
            mode = request.mode.as_str(),
            chars = content.chars().count(),
            "response generated"
        );

        Ok(self.envelope(correlation_id, content, Usage::rendered_placeholder()))
    }

    fn envelope(
        &self,
        correlation_id: &str,
        content: impl Into<String>,
        usage: Usage,
    ) -> CompletionResponse {
        CompletionResponse::assistant(correlation_id, self.model.as_str(), content, usage)
    }
}
