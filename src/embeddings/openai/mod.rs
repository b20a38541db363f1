
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Embedder, Embedding};
use crate::config::ProviderConfig;
use crate::http::HttpTransport;
use crate::{RagError, Result};

const EMBEDDINGS_PATH: &str = "embeddings";

/// Embedding adapter for `POST {base_url}/embeddings` (OpenAI wire format)
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingClient {
    transport: HttpTransport,
    model: String,
    batch_size: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingClient {
    #[inline]
    pub fn new(provider: &ProviderConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(provider)?;
        Ok(Self::with_transport(
            transport,
            provider.embedding_model.clone(),
            provider.batch_size as usize,
        ))
    }

    #[inline]
    pub fn with_transport(transport: HttpTransport, model: String, batch_size: usize) -> Self {
        Self {
            transport,
            model,
            batch_size: batch_size.max(1),
        }
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn embed_single_request(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response: EmbeddingResponse = self
            .transport
            .post_json(EMBEDDINGS_PATH, &request)
            .context("Failed to generate embeddings")
            .map_err(|e| RagError::EmbeddingService(format!("{:#}", e)))?;

        if response.data.len() != texts.len() {
            return Err(RagError::EmbeddingService(format!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                response.data.len()
            )));
        }

        // The service tags each vector with its input position
        let mut data = response.data;
        data.sort_by_key(|item| item.index);
        if data.iter().enumerate().any(|(i, item)| item.index != i) {
            return Err(RagError::EmbeddingService(
                "Response indices do not cover the request".to_string(),
            ));
        }

        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}

impl Embedder for OpenAiEmbeddingClient {
    #[inline]
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(position) = texts.iter().position(|text| text.is_empty()) {
            return Err(RagError::InvalidInput(format!(
                "Cannot embed empty text at position {}",
                position
            )));
        }

        debug!(
            "Generating embeddings for {} texts with {}",
            texts.len(),
            self.model
        );

        let mut embeddings = Vec::with_capacity(texts.len());

        // Large batches are split to respect the per-request input limit
        for batch in texts.chunks(self.batch_size) {
            let batch_embeddings = self.embed_single_request(batch)?;
            embeddings.extend(batch_embeddings);
        }

        debug!(
            "Generated {} embeddings ({} dimensions)",
            embeddings.len(),
            embeddings.first().map_or(0, Vec::len)
        );

        Ok(embeddings)
    }
}
