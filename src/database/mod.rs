// Database module
// In-memory vector collection for chunk embeddings

pub mod vector_store;


use serde::{Deserialize, Serialize};

pub use vector_store::{QueryMatch, VectorStore};

/// Metadata stored alongside each chunk embedding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Declared filename of the uploaded document
    pub source: String,
    /// Index of this chunk within its document, before blank chunks were dropped
    pub chunk: usize,
}

impl ChunkMetadata {
    #[inline]
    pub fn new(source: impl Into<String>, chunk: usize) -> Self {
        Self {
            source: source.into(),
            chunk,
        }
    }
}
