// Prompt translation through a chat model

use super::{CollaboratorError, Translator};
use async_trait::async_trait;
use openai::{ChatRequest, Message, OpenAiClient};

/// Translates text to English with a chat completion
pub struct LlmTranslator {
    client: OpenAiClient,
    model: String,
    instructions: String,
}

impl LlmTranslator {
    pub fn new(client: OpenAiClient, model: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            instructions: instructions.into(),
        }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str) -> Result<String, CollaboratorError> {
        tracing::debug!("Translating prompt with {}", self.model);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::system(&self.instructions), Message::user(text)],
        };
        let response = self.client.chat(&request).await?;

        response
            .first_content()
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(str::to_string)
            .ok_or(CollaboratorError::MissingField("choices[0].message.content"))
    }
}
