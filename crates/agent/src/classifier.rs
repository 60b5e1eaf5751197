use std::sync::Arc;

use kfzroute_core::{ApplicationError, ChatMessage};
use kfzroute_store::IntentIndexRepository;
use tracing::{info, warn};

use crate::llm::LanguageModel;
use crate::prompts::classification_prompt;

pub const CLASSIFICATION_TEMPERATURE: f32 = 0.1;
pub const UNKNOWN_INTENT: &str = "unknown";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Matched(String),
    Unknown,
    /// The model named something that is not an active catalog slug.
    OutsideCatalog(String),
}

impl Classification {
    pub fn into_slug(self) -> Option<String> {
        match self {
            Self::Matched(slug) => Some(slug),
            Self::Unknown | Self::OutsideCatalog(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct IntentClassifier {
    intents: IntentIndexRepository,
    llm: Arc<dyn LanguageModel>,
}

impl IntentClassifier {
    pub fn new(intents: IntentIndexRepository, llm: Arc<dyn LanguageModel>) -> Self {
        Self { intents, llm }
    }

    pub async fn classify(&self, user_message: &str) -> Result<Classification, ApplicationError> {
        let catalog = self.intents.load_active().await?;
        if catalog.is_empty() {
            warn!(
                event_name = "pipeline.intent.catalog_empty",
                "no active intents; classification can only answer unknown"
            );
        }

        let reply = self
            .llm
            .complete(
                &[ChatMessage::system(classification_prompt(&catalog)), ChatMessage::user(user_message)],
                CLASSIFICATION_TEMPERATURE,
            )
            .await?;

        let candidate = reply.trim();
        if candidate == UNKNOWN_INTENT {
            return Ok(Classification::Unknown);
        }

        if !catalog.contains(candidate) {
            warn!(
                event_name = "pipeline.intent.outside_catalog",
                reply = %candidate,
                catalog_size = catalog.len(),
                "model reply is not an active intent slug"
            );
            return Ok(Classification::OutsideCatalog(candidate.to_string()));
        }

        info!(event_name = "pipeline.intent.classified", intent = %candidate, "intent classified");
        Ok(Classification::Matched(candidate.to_string()))
    }

    pub async fn extract_intent(&self, user_message: &str) -> Result<Option<String>, ApplicationError> {
        Ok(self.classify(user_message).await?.into_slug())
    }
}
