// Completion module
// Chat message types, the completion service adapter and answer composition

pub mod openai;


use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::retrieval::RetrievalOutcome;
use crate::{RagError, Result};

pub use openai::OpenAiChatClient;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions about documents. \
Use the provided context to answer accurately. If the information is not in the context, say so.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[inline]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[inline]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[inline]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Generates a reply for a conversation
pub trait Completer {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

impl<C: Completer + ?Sized> Completer for &C {
    #[inline]
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        (**self).complete(messages)
    }
}

/// Fill the answer template with retrieved context and the user's question
#[inline]
pub fn render_prompt(context: &str, question: &str) -> String {
    format!(
        "Based on the following document context, answer the user's question.\n\
         If the context doesn't contain the answer, say so clearly.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer:"
    )
}

/// Turns retrieved context and a question into a generated answer
#[derive(Debug, Clone)]
pub struct AnswerComposer<C> {
    completer: C,
}

impl<C: Completer> AnswerComposer<C> {
    #[inline]
    pub fn new(completer: C) -> Self {
        Self { completer }
    }

    #[inline]
    pub fn completer(&self) -> &C {
        &self.completer
    }

    /// The system message followed by the templated user message
    #[inline]
    pub fn build_messages(&self, context: &str, question: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(render_prompt(context, question)),
        ]
    }

    /// Answer `question` from a retrieval outcome
    ///
    /// Sentinel outcomes are passed to the model as the context text, so the
    /// reply explains that nothing relevant is indexed.
    #[inline]
    pub fn answer(&self, outcome: &RetrievalOutcome, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidInput("Question is empty".to_string()));
        }

        let messages = self.build_messages(outcome.context_text(), question);
        debug!(
            "Requesting answer with {} context chunks",
            outcome.matches().len()
        );
        self.completer.complete(&messages)
    }
}
