use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::ApplicationError;

pub const INVALID_MESSAGES: &str = "Invalid request: messages array required";
pub const NO_USER_MESSAGE: &str = "No user message found";

/// Reply when the classifier cannot map the question to a known intent.
pub const CLARIFICATION_REPLY: &str = "Entschuldigung, ich konnte Ihre Anfrage keinem bekannten Vorgang zuordnen. Könnten Sie bitte präzisieren, worum es geht?";

/// Reply when an intent matched but no active case record exists for it.
pub const NOT_FOUND_REPLY: &str =
    "Entschuldigung, ich konnte keine Informationen zu diesem Vorgang finden.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    #[default]
    Answer,
    Data,
}

impl ResponseMode {
    /// Only the literal `"data"` selects structured output.
    pub fn from_request(raw: Option<&str>) -> Self {
        match raw {
            Some("data") => Self::Data,
            _ => Self::Answer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answer => "answer",
            Self::Data => "data",
        }
    }
}

/// The validated part of an inbound `/chat/completions` body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatCompletionRequest {
    pub user_message: String,
    pub mode: ResponseMode,
}

impl ChatCompletionRequest {
    /// Picks the last `user` message. Its content must be a non-empty string;
    /// earlier user messages are never used as a fallback.
    pub fn from_value(body: &Value) -> Result<Self, ApplicationError> {
        let messages = body
            .get("messages")
            .and_then(Value::as_array)
            .ok_or_else(|| ApplicationError::Validation(INVALID_MESSAGES.to_string()))?;

        let user_message = messages
            .iter()
            .rev()
            .find(|message| message.get("role").and_then(Value::as_str) == Some("user"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ApplicationError::Validation(NO_USER_MESSAGE.to_string()))?;

        let mode = ResponseMode::from_request(body.get("mode").and_then(Value::as_str));

        Ok(Self { user_message: user_message.to_string(), mode })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: Usage,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: String,
}

/// Token counts are placeholders and are never measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub const fn zero() -> Self {
        Self { prompt_tokens: 0, completion_tokens: 0, total_tokens: 0 }
    }

    pub const fn rendered_placeholder() -> Self {
        Self { prompt_tokens: 100, completion_tokens: 50, total_tokens: 150 }
    }
}

impl CompletionResponse {
    pub fn assistant(
        id: impl Into<String>,
        model: impl Into<String>,
        content: impl Into<String>,
        usage: Usage,
    ) -> Self {
        Self {
            id: id.into(),
            object: "chat.completion".to_string(),
            created: Utc::now().timestamp(),
            model: model.into(),
            choices: vec![CompletionChoice {
                index: 0,
                message: ChatMessage::assistant(content),
                finish_reason: "stop".to_string(),
            }],
            usage,
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.message.content.as_str())
    }
}

pub fn new_completion_id() -> String {
    format!("chatcmpl-{}", Uuid::new_v4().simple())
}
