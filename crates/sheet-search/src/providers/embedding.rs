//! Embedding seam used by the chunk store for cell text and queries

use async_trait::async_trait;
use crate::error::Result;

/// Turns cell text and query text into vectors of a fixed dimension.
///
/// Implementations:
/// - `OllamaEmbedder`: Ollama server (nomic-embed-text)
/// - `HashingEmbedder`: feature hashing, works offline
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Vectors for several texts, in input order.
    ///
    /// The store calls this once per document with only the chunks whose text changed.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Length of every returned vector
    fn dimensions(&self) -> usize;

    /// Whether the backend is reachable (used by `/ready`)
    async fn health_check(&self) -> Result<bool>;

    fn name(&self) -> &str;
}
