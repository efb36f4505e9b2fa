//! Vector store trait: content-addressed chunk storage with similarity query

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{ChunkRecord, MetadataMap};

/// Raw match returned by a store query
#[derive(Debug, Clone, PartialEq)]
pub struct StoreMatch {
    /// Chunk id
    pub id: String,
    /// Stored chunk text
    pub text: String,
    /// Stored metadata; fields may be missing for records written by other tools
    pub metadata: MetadataMap,
    /// Similarity score (higher is more similar)
    pub score: f32,
}

/// Trait for chunk storage and similarity search.
///
/// Writes are upserts: a record whose id already exists replaces the stored one,
/// so re-indexing unchanged cells does not grow the store.
///
/// Implementations:
/// - `SqliteChunkStore`: local SQLite file with brute-force cosine ranking
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert or replace one record (fails with `Error::StoreWrite`)
    async fn upsert(&self, record: &ChunkRecord) -> Result<()>;

    /// Insert or replace several records
    async fn upsert_batch(&self, records: &[ChunkRecord]) -> Result<()> {
        for record in records {
            self.upsert(record).await?;
        }
        Ok(())
    }

    /// Best-first matches for a query text (fails with `Error::StoreQuery`)
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<StoreMatch>>;

    /// Delete every chunk of a file, returning how many were removed
    async fn delete_by_file(&self, file_id: &str) -> Result<usize>;

    /// Get total number of chunks stored
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Get store name for logging
    fn name(&self) -> &str;
}
