#[cfg(test)]
mod tests;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatMessage, Completer};
use crate::config::ProviderConfig;
use crate::http::HttpTransport;
use crate::{RagError, Result};

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Completion adapter for `POST {base_url}/chat/completions` (OpenAI wire format)
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    transport: HttpTransport,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiChatClient {
    #[inline]
    pub fn new(provider: &ProviderConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(provider)?;
        Ok(Self::with_transport(
            transport,
            provider.completion_model.clone(),
        ))
    }

    #[inline]
    pub fn with_transport(transport: HttpTransport, model: String) -> Self {
        Self { transport, model }
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Completer for OpenAiChatClient {
    #[inline]
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!(
            "Requesting completion from {} ({} messages)",
            self.model,
            messages.len()
        );

        let request = ChatRequest {
            model: &self.model,
            messages,
        };

        let response: ChatResponse = self
            .transport
            .post_json(CHAT_COMPLETIONS_PATH, &request)
            .context("Failed to generate completion")
            .map_err(|e| RagError::CompletionService(format!("{:#}", e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                RagError::CompletionService("Response contained no message content".to_string())
            })?;

        debug!("Received completion ({} chars)", content.chars().count());
        Ok(content)
    }
}
