//! Chat completion for answer generation.

mod openai;

pub use openai::OpenAIChat;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A completion request: prompt plus optional system prompt.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Falls back to the model's configured token cap.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Messages in send order: system (if any), then the prompt.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::new(ChatRole::System, system));
        }
        messages.push(ChatMessage::new(ChatRole::User, self.prompt.clone()));
        messages
    }
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run the completion, surfacing upstream errors.
    async fn try_complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Run the completion. Upstream errors are logged and returned as the
    /// answer text (`"API call failed: <upstream message>"`), never raised.
    async fn complete(&self, request: &CompletionRequest) -> String {
        match self.try_complete(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Chat completion failed: {}", e);
                format!("API call failed: {}", e.upstream_message())
            }
        }
    }

    /// Model name, for logging.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TravelRagError;

    struct Unreachable;

    #[async_trait]
    impl ChatModel for Unreachable {
        async fn try_complete(&self, _request: &CompletionRequest) -> Result<String> {
            Err(TravelRagError::OpenAI("connection refused".to_string()))
        }

        fn model(&self) -> &str {
            "unreachable"
        }
    }

    #[test]
    fn test_message_order() {
        let request = CompletionRequest::new("What is there to do?")
            .with_system("You are a travel assistant.");

        let roles: Vec<ChatRole> = request.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::System, ChatRole::User]);
        assert_eq!(request.messages().last().unwrap().content, "What is there to do?");
    }

    #[test]
    fn test_no_system_message_without_prompt() {
        let request = CompletionRequest::new("Hi");
        assert_eq!(request.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_degrades_to_error_string() {
        let answer = Unreachable.complete(&CompletionRequest::new("Hi")).await;
        assert_eq!(answer, "API call failed: connection refused");
    }
}
