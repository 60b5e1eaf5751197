use thiserror::Error;

use crate::flows::states::{PipelineEvent, PipelineState, TransitionOutcome};

#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineEngine;

impl PipelineEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn initial_state(&self) -> PipelineState {
        PipelineState::ReceiveRequest
    }

    pub fn apply(
        &self,
        current: PipelineState,
        event: PipelineEvent,
    ) -> Result<TransitionOutcome, PipelineTransitionError> {
        transition(current, event)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineTransitionError {
    #[error("invalid pipeline transition from {state:?} using event {event:?}")]
    InvalidTransition { state: PipelineState, event: PipelineEvent },
}

fn transition(
    current: PipelineState,
    event: PipelineEvent,
) -> Result<TransitionOutcome, PipelineTransitionError> {
    use PipelineEvent::{
        CaseFound, CaseMissing, InputAccepted, InputRejected, IntentMatched, IntentUnmatched,
        ReplyComposed, RequestReceived, ResponseRendered, StageFailed,
    };
    use PipelineState::{
        ClassifyIntent, EmitError, EmitResponse, NoCaseFound, NoIntentMatch, ReceiveRequest,
        RenderResponse, ResolveCase, ValidateInput,
    };

    let to = match (current, event) {
        (ReceiveRequest, RequestReceived) => ValidateInput,
        (ValidateInput, InputAccepted) => ClassifyIntent,
        (ValidateInput, InputRejected) => EmitError,
        (ClassifyIntent, IntentMatched) => ResolveCase,
        (ClassifyIntent, IntentUnmatched) => NoIntentMatch,
        (ResolveCase, CaseFound) => RenderResponse,
        (ResolveCase, CaseMissing) => NoCaseFound,
        (RenderResponse, ResponseRendered) => EmitResponse,
        (NoIntentMatch, ReplyComposed) | (NoCaseFound, ReplyComposed) => EmitResponse,
        (state, StageFailed) if !state.is_terminal() => EmitError,
        _ => return Err(PipelineTransitionError::InvalidTransition { state: current, event }),
    };

    Ok(TransitionOutcome { from: current, to, event })
}
