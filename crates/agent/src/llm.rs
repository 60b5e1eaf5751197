use std::time::Duration;

use async_trait::async_trait;
use kfzroute_core::config::LlmConfig;
use kfzroute_core::{ApplicationError, ChatMessage};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("language model request failed: {status}")]
    Status { status: String },
    #[error("language model returned no message content")]
    MissingContent,
}

impl From<LlmError> for ApplicationError {
    fn from(error: LlmError) -> Self {
        ApplicationError::LanguageModel(error.to_string())
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// The identifier reported in completion envelopes.
    fn model(&self) -> &str;

    async fn complete(&self, messages: &[ChatMessage], temperature: f32)
        -> Result<String, LlmError>;

    async fn complete_default(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.complete(messages, DEFAULT_TEMPERATURE).await
    }
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionReply {
    #[serde(default)]
    choices: Vec<ReplyChoice>,
}

#[derive(Deserialize)]
struct ReplyChoice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        model: impl Into<String>,
    ) -> Self {
        Self { client, base_url: base_url.into(), api_key, model: model.into() }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(timeout_secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }

        Ok(Self::new(
            builder.build()?,
            config.base_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
        ))
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        let key = self.api_key.as_ref().map(|key| key.expose_secret()).unwrap_or_default();

        debug!(
            event_name = "llm.completion.start",
            model = %self.model,
            temperature,
            message_count = messages.len(),
            "requesting chat completion"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(key)
            .json(&CompletionRequest { model: &self.model, messages, temperature })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status { status: status.to_string() });
        }

        let reply: CompletionReply = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::MissingContent)
    }
}
