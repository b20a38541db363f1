// Indexer module
// Turns uploaded PDFs into chunk embeddings stored in the vector store


use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::database::{ChunkMetadata, VectorStore};
use crate::embeddings::{Embedder, TextChunker};
use crate::extraction::extract_pdf_text;
use crate::{RagError, Result};

const FALLBACK_STEM: &str = "document";

/// Indexing behaviour settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Remove a file's previously stored chunks before re-indexing it
    pub purge_stale_chunks: bool,
}

/// A document handed to the indexer: raw bytes plus the filename it was uploaded under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    #[inline]
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping its file name as the declared filename
    #[inline]
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let filename = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Ok(Self { filename, bytes })
    }
}

/// Outcome of indexing several files
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files that were indexed, with the number of chunks stored for each
    pub indexed: Vec<(String, usize)>,
    /// Files that failed, with the reason
    pub failed: Vec<(String, RagError)>,
}

impl BatchReport {
    #[inline]
    pub fn total_chunks(&self) -> usize {
        self.indexed.iter().map(|(_, chunks)| chunks).sum()
    }

    #[inline]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Progress notification emitted once per file by [`Indexer::index_batch_with_progress`]
#[derive(Debug)]
pub struct FileProgress<'a> {
    /// 1-based position of the file in the batch
    pub position: usize,
    pub total: usize,
    pub filename: &'a str,
    pub result: std::result::Result<usize, &'a RagError>,
}

/// Derive the chunk id prefix from a declared filename
///
/// Uses the file stem of the last path component, replaces every character
/// outside `[A-Za-z0-9._-]` with `_`, and falls back to `document` when
/// nothing is left.
#[inline]
pub fn sanitize_stem(filename: &str) -> String {
    let last = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let stem = match last.rfind('.') {
        Some(0) | None => last,
        Some(dot) => last.get(..dot).unwrap_or(last),
    };

    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        sanitized
    }
}

/// Extract, chunk, embed and store PDF documents
#[derive(Debug, Clone)]
pub struct Indexer<E> {
    embedder: E,
    chunker: TextChunker,
    purge_stale: bool,
}

impl<E: Embedder> Indexer<E> {
    #[inline]
    pub fn new(embedder: E, chunker: TextChunker) -> Self {
        Self {
            embedder,
            chunker,
            purge_stale: false,
        }
    }

    /// Build an indexer from the chunking and indexing sections of `config`
    #[inline]
    pub fn from_config(embedder: E, config: &Config) -> Result<Self> {
        let chunker = TextChunker::from_config(&config.chunking)?;
        Ok(Self::new(embedder, chunker).with_purge_stale(config.indexing.purge_stale_chunks))
    }

    #[inline]
    pub fn with_purge_stale(mut self, purge_stale: bool) -> Self {
        self.purge_stale = purge_stale;
        self
    }

    #[inline]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    #[inline]
    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    /// Index one PDF into `store`
    ///
    /// Extracts page-tagged text, splits it into overlapping chunks, drops
    /// whitespace-only chunks, embeds the rest in one batch and stores them
    /// under ids `{stem}_{chunk index}`. Nothing is written unless every step
    /// succeeds.
    ///
    /// # Returns
    /// * `Result<usize>` - Number of chunks stored; `0` when the PDF has no
    ///   extractable text. Errors are wrapped in [`RagError::Indexing`].
    #[inline]
    pub fn index_pdf(&self, store: &mut VectorStore, pdf: &[u8], filename: &str) -> Result<usize> {
        self.index_pdf_inner(store, pdf, filename)
            .map_err(|source| RagError::Indexing {
                filename: filename.to_string(),
                source: Box::new(source),
            })
    }

    fn index_pdf_inner(&self, store: &mut VectorStore, pdf: &[u8], filename: &str) -> Result<usize> {
        debug!("Indexing {} ({} bytes)", filename, pdf.len());

        let extracted = extract_pdf_text(pdf)?;
        let text = extracted.text();

        let (indices, documents): (Vec<usize>, Vec<String>) = self
            .chunker
            .chunks(&text)
            .enumerate()
            .filter(|(_, chunk)| !chunk.trim().is_empty())
            .map(|(index, chunk)| (index, chunk.to_string()))
            .unzip();

        if documents.is_empty() {
            warn!("No text to index in {}", filename);
            return Ok(0);
        }

        let embeddings = self.embedder.embed_batch(&documents)?;
        if embeddings.len() != documents.len() {
            return Err(RagError::EmbeddingService(format!(
                "Expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != store.dimension()) {
            return Err(RagError::DimensionMismatch {
                expected: store.dimension(),
                actual: bad.len(),
            });
        }

        let stem = sanitize_stem(filename);
        let ids: Vec<String> = indices
            .iter()
            .map(|index| format!("{}_{}", stem, index))
            .collect();
        let metadatas: Vec<ChunkMetadata> = indices
            .iter()
            .map(|&index| ChunkMetadata::new(filename, index))
            .collect();

        if self.purge_stale {
            let removed = store.delete_source(filename);
            if removed > 0 {
                debug!("Purged {} stale chunks for {}", removed, filename);
            }
        }

        let stored = documents.len();
        store.add(ids, documents, embeddings, metadatas)?;

        info!(
            "Indexed {}: {} pages with text, {} chunks",
            filename,
            extracted.pages().len(),
            stored
        );
        Ok(stored)
    }

    /// Index several files one after another; a failing file does not stop the batch
    #[inline]
    pub fn index_batch(&self, store: &mut VectorStore, files: &[UploadedFile]) -> BatchReport {
        self.index_batch_with_progress(store, files, |_| {})
    }

    /// Like [`Indexer::index_batch`], calling `on_progress` after each file
    #[inline]
    pub fn index_batch_with_progress<F>(
        &self,
        store: &mut VectorStore,
        files: &[UploadedFile],
        mut on_progress: F,
    ) -> BatchReport
    where
        F: FnMut(FileProgress<'_>),
    {
        let mut report = BatchReport::default();
        let total = files.len();

        for (position, file) in files.iter().enumerate() {
            match self.index_pdf(store, &file.bytes, &file.filename) {
                Ok(chunks) => {
                    on_progress(FileProgress {
                        position: position + 1,
                        total,
                        filename: &file.filename,
                        result: Ok(chunks),
                    });
                    report.indexed.push((file.filename.clone(), chunks));
                }
                Err(e) => {
                    warn!("{}", e);
                    on_progress(FileProgress {
                        position: position + 1,
                        total,
                        filename: &file.filename,
                        result: Err(&e),
                    });
                    report.failed.push((file.filename.clone(), e));
                }
            }
        }

        info!(
            "Batch finished: {} indexed ({} chunks), {} failed",
            report.indexed.len(),
            report.total_chunks(),
            report.failed.len()
        );
        report
    }
}
