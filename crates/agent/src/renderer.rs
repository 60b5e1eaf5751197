use std::sync::Arc;

use kfzroute_core::{ApplicationError, CaseRecord, ChatMessage, ResponseMode};
use serde::Serialize;

use crate::llm::LanguageModel;
use crate::prompts::answer_prompt;

pub const ANSWER_TEMPERATURE: f32 = 0.7;

#[derive(Serialize)]
struct DataPayload<'a> {
    intent: &'a str,
    data: &'a CaseRecord,
    needs_clarification: bool,
}

#[derive(Clone)]
pub struct ResponseRenderer {
    llm: Arc<dyn LanguageModel>,
}

impl ResponseRenderer {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn render(
        &self,
        user_message: &str,
        slug: &str,
        record: &CaseRecord,
        mode: ResponseMode,
    ) -> Result<String, ApplicationError> {
        match mode {
            ResponseMode::Data => render_data(slug, record),
            ResponseMode::Answer => {
                let reply = self
                    .llm
                    .complete(
                        &[ChatMessage::system(answer_prompt(record)), ChatMessage::user(user_message)],
                        ANSWER_TEMPERATURE,
                    )
                    .await?;
                Ok(reply)
            }
        }
    }
}

/// `needs_clarification` is always false: a record was resolved.
fn render_data(slug: &str, record: &CaseRecord) -> Result<String, ApplicationError> {
    serde_json::to_string_pretty(&DataPayload { intent: slug, data: record, needs_clarification: false })
        .map_err(|error| ApplicationError::Internal(format!("could not serialize case record: {error}")))
}
