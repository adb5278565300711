//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the household assistant model.
//! It implements the `ChatModel` port from the `core` crate against any
//! OpenAI-compatible chat completions endpoint (Gemini exposes one).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use hogarzen_core::domain::{ChatMessage, ChatRole};
use hogarzen_core::ports::{ChatModel, PortError, PortResult};

const MAX_REPLY_TOKENS: u32 = 512;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatModel` using an OpenAI-compatible LLM.
/// Without an API key every call fails with `PortError::NotConfigured`, which the
/// assistant turns into its canned replies.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiChatAdapter {
    pub fn new(api_key: Option<String>, api_base: &str, model: String) -> Self {
        let client = api_key.map(|key| {
            Client::with_config(OpenAIConfig::new().with_api_key(key).with_api_base(api_base))
        });
        Self { client, model }
    }

    fn client(&self) -> PortResult<&Client<OpenAIConfig>> {
        self.client
            .as_ref()
            .ok_or_else(|| PortError::NotConfigured("GEMINI_API_KEY".to_string()))
    }

    fn to_request_message(message: &ChatMessage) -> PortResult<ChatCompletionRequestMessage> {
        let content = message.content.clone();
        let built = match message.role {
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map(ChatCompletionRequestMessage::User),
            ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(content)
                .build()
                .map(ChatCompletionRequestMessage::Assistant),
        };
        built.map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

fn provider_error(err: OpenAIError) -> PortError {
    match err {
        OpenAIError::Reqwest(e) if e.is_timeout() => PortError::Timeout,
        OpenAIError::Reqwest(e) => PortError::Network(e.to_string()),
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// `ChatModel` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatModel for OpenAiChatAdapter {
    async fn complete(&self, system_prompt: &str, messages: &[ChatMessage]) -> PortResult<String> {
        let client = self.client()?;

        let mut request_messages = vec![ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        )];
        for message in messages {
            request_messages.push(Self::to_request_message(message)?);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .max_tokens(MAX_REPLY_TOKENS)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = client.chat().create(request).await.map_err(provider_error)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PortError::Malformed("No completion candidate returned".to_string()))
    }

    async fn ping(&self) -> PortResult<()> {
        let client = self.client()?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content("ping")
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            )])
            .max_tokens(1u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        client.chat().create(request).await.map_err(provider_error)?;
        Ok(())
    }
}
