use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Completion service error: {0}")]
    CompletionService(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to index {filename}: {source}")]
    Indexing {
        filename: String,
        #[source]
        source: Box<RagError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl RagError {
    /// The underlying error, looking through per-file indexing attribution
    #[inline]
    pub fn root(&self) -> &Self {
        match self {
            Self::Indexing { source, .. } => source.root(),
            other => other,
        }
    }
}

pub mod commands;
pub mod completion;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod extraction;
pub mod http;
pub mod indexer;
pub mod retrieval;

#[cfg(test)]
pub(crate) mod test_utils;
