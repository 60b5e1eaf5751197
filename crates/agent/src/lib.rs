//! Intent routing for chat-completion requests.
//!
//! The runtime drives one request through three stages:
//! 1. **Classification** (`classifier`) - the model picks an intent slug
//!    from the active `intent_index` catalog.
//! 2. **Resolution** - the active `kfz_vorgaenge` record for that slug is
//!    fetched through `kfzroute_store::CaseResolver`.
//! 3. **Rendering** (`renderer`) - the record is returned as JSON or turned
//!    into a German answer by a second model call.
//!
//! The model never invents case data. Answers are grounded in the stored
//! record, and classifier replies outside the catalog are treated as no match.

pub mod classifier;
pub mod llm;
pub mod prompts;
pub mod renderer;
pub mod runtime;
pub mod scripted;

pub use classifier::{Classification, IntentClassifier};
pub use llm::{LanguageModel, LlmError, OpenAiClient};
pub use renderer::ResponseRenderer;
pub use runtime::{PipelineRun, Reply, RouterRuntime};
pub use scripted::{RecordedCompletion, ScriptedLanguageModel};
