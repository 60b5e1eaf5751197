use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    ReceiveRequest,
    ValidateInput,
    ClassifyIntent,
    NoIntentMatch,
    ResolveCase,
    NoCaseFound,
    RenderResponse,
    EmitResponse,
    EmitError,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::EmitResponse | Self::EmitError)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineEvent {
    RequestReceived,
    InputAccepted,
    InputRejected,
    IntentMatched,
    IntentUnmatched,
    CaseFound,
    CaseMissing,
    ResponseRendered,
    ReplyComposed,
    StageFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: PipelineState,
    pub to: PipelineState,
    pub event: PipelineEvent,
}

impl TransitionOutcome {
    /// HTTP status for a transition into a terminal state, `None` otherwise.
    pub fn status_code(&self) -> Option<u16> {
        match (self.to, self.event) {
            (PipelineState::EmitResponse, _) => Some(200),
            (PipelineState::EmitError, PipelineEvent::InputRejected) => Some(400),
            (PipelineState::EmitError, _) => Some(500),
            _ => None,
        }
    }
}
