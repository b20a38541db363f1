// Embeddings module
// Text chunking and the embedding service adapter

pub mod chunking;
pub mod openai;

use crate::{RagError, Result};

pub use chunking::{ChunkingConfig, Chunks, TextChunker};
pub use openai::OpenAiEmbeddingClient;

/// A dense vector representation of a piece of text
pub type Embedding = Vec<f32>;

/// Turns text into embeddings, one vector per input, in input order
pub trait Embedder {
    /// Embed every text in `texts`. An empty slice yields an empty result.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a single text; equivalent to the first result of a one-element batch
    #[inline]
    fn embed_one(&self, text: &str) -> Result<Embedding> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| {
                RagError::EmbeddingService("Service returned no embedding".to_string())
            })
    }
}

impl<E: Embedder + ?Sized> Embedder for &E {
    #[inline]
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        (**self).embed_batch(texts)
    }

    #[inline]
    fn embed_one(&self, text: &str) -> Result<Embedding> {
        (**self).embed_one(text)
    }
}
