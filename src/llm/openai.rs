//! OpenAI-compatible chat completion (Qwen Plus by default).

use super::{ChatMessage, ChatModel, ChatRole, CompletionRequest};
use crate::config::LlmSettings;
use crate::error::{Result, TravelRagError};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model behind an OpenAI-compatible endpoint.
pub struct OpenAIChat {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIChat {
    /// Create a chat client from settings.
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        let content = message.content.clone();
        let built: ChatCompletionRequestMessage = match message.role {
            ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| TravelRagError::Rag(e.to_string()))?
                .into(),
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| TravelRagError::Rag(e.to_string()))?
                .into(),
        };
        Ok(built)
    }
}

#[async_trait]
impl ChatModel for OpenAIChat {
    #[allow(deprecated)]
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn try_complete(&self, request: &CompletionRequest) -> Result<String> {
        let messages = request
            .messages()
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let completion = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(request.max_tokens.unwrap_or(self.max_tokens))
            .build()
            .map_err(|e| TravelRagError::Rag(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(completion)
            .await
            .map_err(|e| TravelRagError::OpenAI(e.to_string()))?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| TravelRagError::Rag("Empty response from LLM".to_string()))?;

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
