
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use super::ChunkMetadata;
use crate::embeddings::Embedding;
use crate::{RagError, Result};

/// In-memory vector collection with a fixed embedding dimensionality
///
/// Entries are keyed by chunk id; adding an existing id replaces the whole
/// entry. Nothing is persisted, and [`VectorStore::clear`] resets the
/// collection in place.
#[derive(Debug, Clone)]
pub struct VectorStore {
    dimension: usize,
    entries: HashMap<String, StoredChunk>,
}

#[derive(Debug, Clone)]
struct StoredChunk {
    embedding: Embedding,
    norm: f32,
    document: String,
    metadata: ChunkMetadata,
}

/// One ranked result of a similarity query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub document: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity to the query; higher is closer
    pub score: f32,
}

impl VectorStore {
    /// Create an empty collection
    ///
    /// # Arguments
    /// * `dimension` - Length every stored and queried embedding must have
    #[inline]
    pub fn new(dimension: usize) -> Self {
        debug!("Creating vector store with dimension {}", dimension);
        Self {
            dimension,
            entries: HashMap::new(),
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored entries
    #[inline]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert or replace entries by id
    ///
    /// The four sequences are parallel and must have equal length. Every
    /// embedding is checked before anything is written, so a failed call
    /// leaves the collection unchanged.
    ///
    /// # Returns
    /// * `Result<()>` - `InvalidInput` on length mismatch, `DimensionMismatch`
    ///   when an embedding has the wrong length
    #[inline]
    pub fn add(
        &mut self,
        ids: Vec<String>,
        documents: Vec<String>,
        embeddings: Vec<Embedding>,
        metadatas: Vec<ChunkMetadata>,
    ) -> Result<()> {
        let len = ids.len();
        if documents.len() != len || embeddings.len() != len || metadatas.len() != len {
            return Err(RagError::InvalidInput(format!(
                "Sequences must have equal length: {} ids, {} documents, {} embeddings, {} metadatas",
                len,
                documents.len(),
                embeddings.len(),
                metadatas.len()
            )));
        }

        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }

        let mut replaced = 0;
        for (((id, document), embedding), metadata) in ids
            .into_iter()
            .zip(documents)
            .zip(embeddings)
            .zip(metadatas)
        {
            let norm = l2_norm(&embedding);
            let entry = StoredChunk {
                embedding,
                norm,
                document,
                metadata,
            };
            if self.entries.insert(id, entry).is_some() {
                replaced += 1;
            }
        }

        info!(
            "Stored {} chunks ({} replaced), collection now holds {}",
            len,
            replaced,
            self.entries.len()
        );
        Ok(())
    }

    /// Find the `k` entries most similar to `embedding` by cosine similarity
    ///
    /// Results are ordered by descending score, ties by id. An empty
    /// collection always yields an empty result.
    #[inline]
    pub fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<QueryMatch>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if embedding.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let query_norm = l2_norm(embedding);
        let mut scored: Vec<(&String, &StoredChunk, f32)> = self
            .entries
            .iter()
            .map(|(id, entry)| {
                let score = cosine_similarity(embedding, query_norm, &entry.embedding, entry.norm);
                (id, entry, score)
            })
            .collect();

        scored.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.cmp(b.0)));
        scored.truncate(k);

        debug!(
            "Query matched {} of {} entries (k = {})",
            scored.len(),
            self.entries.len(),
            k
        );

        Ok(scored
            .into_iter()
            .map(|(id, entry, score)| QueryMatch {
                id: id.clone(),
                document: entry.document.clone(),
                metadata: entry.metadata.clone(),
                score,
            })
            .collect())
    }

    /// Remove every entry
    #[inline]
    pub fn clear(&mut self) {
        info!("Clearing {} entries from vector store", self.entries.len());
        self.entries.clear();
    }

    /// Remove all chunks indexed from `source`
    ///
    /// # Returns
    /// * `usize` - Number of removed entries
    #[inline]
    pub fn delete_source(&mut self, source: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.metadata.source != source);
        let removed = before - self.entries.len();
        debug!("Deleted {} chunks for source: {}", removed, source);
        removed
    }

    /// Distinct sources currently indexed, sorted
    #[inline]
    pub fn sources(&self) -> Vec<String> {
        self.entries
            .values()
            .map(|entry| entry.metadata.source.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|v| v * v).sum::<f32>().sqrt()
}

fn cosine_similarity(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let score = dot / (a_norm * b_norm);
    // Overflowing components give inf / inf
    if score.is_finite() {
        score
    } else {
        0.0
    }
}
