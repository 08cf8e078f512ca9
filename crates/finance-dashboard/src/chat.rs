//! Chat transcript with the AI finance assistant

use chrono::{DateTime, Utc};
use finance_api::{ApiError, FinanceApi, ModelResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Assistant reply shown when a prompt fails
pub const CHAT_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Model that produced an assistant reply
    pub model: Option<String>,
}

/// Append-only conversation for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Send `prompt` through `api` and record both sides of the exchange
    ///
    /// The user message is appended before the request goes out. A failed
    /// request appends [`CHAT_ERROR_MESSAGE`] as the assistant reply. Blank
    /// prompts are ignored and return `None`.
    pub async fn submit<A>(&mut self, api: &A, prompt: &str) -> Option<&ChatMessage>
    where
        A: FinanceApi + ?Sized,
    {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        self.push_user(prompt);
        let result = api.send_prompt(prompt).await;
        Some(self.push_reply(result))
    }

    /// Append a user message
    pub fn push_user(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.push(Role::User, content.into(), None)
    }

    /// Append the assistant side of an exchange
    pub fn push_reply(&mut self, result: Result<ModelResponse, ApiError>) -> &ChatMessage {
        match result {
            Ok(response) => {
                debug!(model = ?response.model, "Assistant replied");
                self.push(Role::Assistant, response.content, response.model)
            }
            Err(err) => {
                warn!("Prompt failed: {}", err);
                self.push(Role::Assistant, CHAT_ERROR_MESSAGE.to_string(), None)
            }
        }
    }

    fn push(&mut self, role: Role, content: String, model: Option<String>) -> &ChatMessage {
        let message = ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: self.next_timestamp(),
            model,
        };
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    // Never earlier than the previous message, even if the clock steps back
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        self.messages
            .last()
            .map_or(now, |last| now.max(last.timestamp))
    }
}
