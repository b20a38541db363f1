//! Question-time retrieval: embed the question, query the store, assemble context.


use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{Config, ConfigError};
use crate::database::{QueryMatch, VectorStore};
use crate::embeddings::Embedder;
use crate::Result;

pub const EMPTY_STORE_MESSAGE: &str =
    "No documents have been indexed yet. Please upload some documents first.";
pub const NO_MATCHES_MESSAGE: &str = "No relevant context found.";

const CONTEXT_SEPARATOR: &str = "\n\n";
const MAX_TOP_K: usize = 100;

/// Retrieval settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks placed in the answer context
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    #[inline]
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

impl RetrievalConfig {
    #[inline]
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.top_k == 0 || self.top_k > MAX_TOP_K {
            return Err(ConfigError::InvalidTopK(self.top_k));
        }
        Ok(())
    }
}

/// What retrieval found for a question
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// Nothing has been indexed
    EmptyStore,
    /// The store returned no matches
    NoMatches,
    /// Matched chunks in ranking order and their joined text
    Context {
        text: String,
        matches: Vec<QueryMatch>,
    },
}

impl RetrievalOutcome {
    /// Context text handed to the answer composer; sentinel messages for the empty cases
    #[inline]
    pub fn context_text(&self) -> &str {
        match self {
            Self::EmptyStore => EMPTY_STORE_MESSAGE,
            Self::NoMatches => NO_MATCHES_MESSAGE,
            Self::Context { text, .. } => text,
        }
    }

    #[inline]
    pub fn matches(&self) -> &[QueryMatch] {
        match self {
            Self::Context { matches, .. } => matches,
            Self::EmptyStore | Self::NoMatches => &[],
        }
    }

    #[inline]
    pub fn has_context(&self) -> bool {
        matches!(self, Self::Context { .. })
    }
}

/// Finds the chunks most relevant to a question
#[derive(Debug, Clone)]
pub struct Retriever<E> {
    embedder: E,
    top_k: usize,
}

impl<E: Embedder> Retriever<E> {
    /// Create a retriever; a `top_k` of zero is raised to one
    #[inline]
    pub fn new(embedder: E, top_k: usize) -> Self {
        Self {
            embedder,
            top_k: top_k.max(1),
        }
    }

    #[inline]
    pub fn from_config(embedder: E, config: &Config) -> Result<Self> {
        config.retrieval.validate()?;
        Ok(Self::new(embedder, config.retrieval.top_k))
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    #[inline]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Retrieve context for `question`
    ///
    /// An empty store short-circuits to [`RetrievalOutcome::EmptyStore`]
    /// without contacting the embedding service.
    #[inline]
    pub fn retrieve(&self, store: &VectorStore, question: &str) -> Result<RetrievalOutcome> {
        if store.is_empty() {
            info!("Retrieval requested with no indexed documents");
            return Ok(RetrievalOutcome::EmptyStore);
        }

        let query = self.embedder.embed_one(question)?;
        let matches = store.query(&query, self.top_k)?;

        if matches.is_empty() {
            return Ok(RetrievalOutcome::NoMatches);
        }

        debug!(
            "Retrieved {} chunks: {}",
            matches.len(),
            matches
                .iter()
                .map(|m| format!("{} ({:.3})", m.id, m.score))
                .join(", ")
        );

        let text = matches
            .iter()
            .map(|m| m.document.as_str())
            .join(CONTEXT_SEPARATOR);
        Ok(RetrievalOutcome::Context { text, matches })
    }
}
