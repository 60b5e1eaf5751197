use std::collections::VecDeque;

use async_trait::async_trait;
use kfzroute_core::config::DEFAULT_MODEL;
use kfzroute_core::ChatMessage;
use tokio::sync::Mutex;

use crate::llm::{LanguageModel, LlmError};

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCompletion {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

enum ScriptedReply {
    Text(String),
    Failure(String),
}

/// Replays queued replies in order and records every request. Used to drive
/// the pipeline without a remote model.
#[derive(Default)]
pub struct ScriptedLanguageModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<RecordedCompletion>>,
}

impl ScriptedLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, text: impl Into<String>) -> Self {
        self.replies.get_mut().push_back(ScriptedReply::Text(text.into()));
        self
    }

    /// The next call fails as if the provider answered with `status`.
    pub fn fail(mut self, status: impl Into<String>) -> Self {
        self.replies.get_mut().push_back(ScriptedReply::Failure(status.into()));
        self
    }

    pub async fn calls(&self) -> Vec<RecordedCompletion> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLanguageModel {
    fn model(&self) -> &str {
        DEFAULT_MODEL
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        self.calls.lock().await.push(RecordedCompletion { messages: messages.to_vec(), temperature });

        match self.replies.lock().await.pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure(status)) => Err(LlmError::Status { status }),
            None => Err(LlmError::MissingContent),
        }
    }
}
