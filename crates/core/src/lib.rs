//! Shared building blocks for the kfzroute middleware: configuration, the
//! error taxonomy, the chat/intent/case domain types and the per-request
//! pipeline state machine.

pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;

pub use domain::case::CaseRecord;
pub use domain::chat::{
    ChatCompletionRequest, ChatMessage, ChatRole, CompletionResponse, ResponseMode, Usage,
};
pub use domain::intent::{IntentCatalog, IntentRecord};
pub use errors::{ApplicationError, InterfaceError};
pub use flows::{PipelineEngine, PipelineEvent, PipelineState, TransitionOutcome};
