//! SQLite chunk store with embedded vectors
//!
//! Persists chunk text, metadata and embedding in one table keyed by chunk id.
//! Queries rank every stored vector by cosine similarity to the query embedding.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{ChunkRecord, MetadataMap};

use super::embedding::EmbeddingProvider;
use super::vector_store::{ChunkStore, StoreMatch};

/// SQLite-based chunk store
pub struct SqliteChunkStore {
    conn: Arc<Mutex<Connection>>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SqliteChunkStore {
    /// Create or open the store at the given path
    pub fn new<P: AsRef<Path>>(path: P, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Config(format!("Failed to open chunk store: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            embedder,
        };

        store.migrate()?;
        Ok(store)
    }

    /// Create an in-memory store
    pub fn in_memory(embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Config(format!("Failed to open in-memory chunk store: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            embedder,
        };

        store.migrate()?;
        Ok(store)
    }

    /// Run schema migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
        "#,
        )
        .map_err(|e| Error::Config(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                file_id TEXT NOT NULL,
                text TEXT NOT NULL,
                metadata TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                embedding BLOB NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_file_id ON chunks(file_id);
        "#,
        )
        .map_err(|e| Error::Config(format!("Failed to create chunk tables: {}", e)))?;

        Ok(())
    }

    /// Stored content hashes for the given ids
    fn existing_hashes(&self, ids: &[&str]) -> Result<HashMap<String, String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT content_hash FROM chunks WHERE id = ?1")
            .map_err(|e| Error::store_write(e.to_string()))?;

        let mut hashes = HashMap::new();
        for id in ids {
            let hash: Option<String> = stmt
                .query_row(params![id], |row| row.get(0))
                .optional()
                .map_err(|e| Error::store_write(e.to_string()))?;
            if let Some(hash) = hash {
                hashes.insert((*id).to_string(), hash);
            }
        }
        Ok(hashes)
    }
}

fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn parse_metadata(id: &str, raw: &str) -> MetadataMap {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::debug!("Chunk {} has unreadable metadata: {}", id, e);
        MetadataMap::new()
    })
}

#[async_trait]
impl ChunkStore for SqliteChunkStore {
    async fn upsert(&self, record: &ChunkRecord) -> Result<()> {
        self.upsert_batch(std::slice::from_ref(record)).await
    }

    async fn upsert_batch(&self, records: &[ChunkRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let hashes: Vec<String> = records.iter().map(|r| content_hash(&r.text)).collect();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        let existing = self.existing_hashes(&ids)?;

        // Only text that changed (or is new) needs a fresh embedding
        let to_embed: Vec<usize> = (0..records.len())
            .filter(|&i| existing.get(&records[i].id) != Some(&hashes[i]))
            .collect();
        let texts: Vec<String> = to_embed.iter().map(|&i| records[i].text.clone()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| Error::store_write(format!("Embedding failed: {}", e)))?;
        if embeddings.len() != texts.len() {
            return Err(Error::store_write(format!(
                "Embedder returned {} vectors for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        let mut fresh: HashMap<usize, Vec<f32>> = to_embed.into_iter().zip(embeddings).collect();

        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::store_write(e.to_string()))?;

        for (i, record) in records.iter().enumerate() {
            let metadata = serde_json::to_string(&record.metadata.to_map())?;
            let written = match fresh.remove(&i) {
                Some(embedding) => tx.execute(
                    r#"
                    INSERT INTO chunks (id, file_id, text, metadata, content_hash, embedding, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(id) DO UPDATE SET
                        file_id = excluded.file_id,
                        text = excluded.text,
                        metadata = excluded.metadata,
                        content_hash = excluded.content_hash,
                        embedding = excluded.embedding,
                        updated_at = excluded.updated_at
                    "#,
                    params![
                        record.id,
                        record.metadata.file_id,
                        record.text,
                        metadata,
                        hashes[i],
                        encode_embedding(&embedding),
                        now,
                    ],
                ),
                None => tx.execute(
                    "UPDATE chunks SET file_id = ?2, metadata = ?3, updated_at = ?4 WHERE id = ?1",
                    params![record.id, record.metadata.file_id, metadata, now],
                ),
            };
            written.map_err(|e| Error::store_write(format!("Chunk {}: {}", record.id, e)))?;
        }

        tx.commit().map_err(|e| Error::store_write(e.to_string()))?;
        tracing::debug!("Upserted {} chunks", records.len());
        Ok(())
    }

    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<StoreMatch>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(text)
            .await
            .map_err(|e| Error::store_query(format!("Embedding failed: {}", e)))?;

        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT id, text, metadata, embedding FROM chunks")
            .map_err(|e| Error::store_query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            })
            .map_err(|e| Error::store_query(e.to_string()))?;

        let mut matches = Vec::new();
        for row in rows {
            let (id, text, metadata, embedding) = row.map_err(|e| Error::store_query(e.to_string()))?;
            let score = cosine_similarity(&query_embedding, &decode_embedding(&embedding));
            matches.push(StoreMatch {
                metadata: parse_metadata(&id, &metadata),
                id,
                text,
                score,
            });
        }

        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(top_k);

        Ok(matches)
    }

    async fn delete_by_file(&self, file_id: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute("DELETE FROM chunks WHERE file_id = ?1", params![file_id])
            .map_err(|e| Error::store_write(e.to_string()))?;
        Ok(deleted)
    }

    async fn len(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(|e| Error::store_query(e.to_string()))?;
        Ok(count as usize)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::HashingEmbedder;
    use crate::testing::CountingEmbedder;
    use crate::types::ChunkMetadata;

    fn record(file_id: &str, col: &str, row: &str, text: &str) -> ChunkRecord {
        ChunkRecord::new(
            text.to_string(),
            ChunkMetadata {
                file_name: format!("{} name", file_id),
                file_id: file_id.to_string(),
                tab_name: "Sheet1".to_string(),
                sheet_id: "0".to_string(),
                col: col.to_string(),
                row: row.to_string(),
            },
            0,
        )
    }

    fn store() -> SqliteChunkStore {
        SqliteChunkStore::in_memory(Arc::new(HashingEmbedder::new(128))).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_replaces_on_duplicate_id() {
        let store = store();
        store.upsert(&record("F1", "A", "2", "first draft")).await.unwrap();
        store.upsert(&record("F1", "A", "2", "first draft")).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);

        store.upsert(&record("F1", "A", "2", "final copy")).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);

        let matches = store.query("final copy", 5).await.unwrap();
        assert_eq!(matches[0].text, "final copy");
    }

    #[tokio::test]
    async fn test_query_ranks_best_first() {
        let store = store();
        store
            .upsert_batch(&[
                record("F1", "A", "2", "marketing budget approval"),
                record("F1", "B", "2", "warehouse inventory count"),
                record("F2", "A", "2", "holiday schedule"),
            ])
            .await
            .unwrap();

        let matches = store.query("inventory in the warehouse", 3).await.unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].id, "F1_0_B2_0");
        assert_eq!(matches[0].metadata["col"], "B");
        assert!(matches[0].score >= matches[1].score);
        assert!(matches[1].score >= matches[2].score);

        assert_eq!(store.query("inventory", 1).await.unwrap().len(), 1);
        assert!(store.query("inventory", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_text_is_not_reembedded() {
        let embedder = Arc::new(CountingEmbedder::new(32));
        let store = SqliteChunkStore::in_memory(embedder.clone()).unwrap();

        let records = vec![record("F1", "A", "2", "alpha"), record("F1", "A", "3", "beta")];
        store.upsert_batch(&records).await.unwrap();
        assert_eq!(embedder.calls(), 2);

        store.upsert_batch(&records).await.unwrap();
        assert_eq!(embedder.calls(), 2);

        store.upsert(&record("F1", "A", "3", "gamma")).await.unwrap();
        assert_eq!(embedder.calls(), 3);
    }

    #[tokio::test]
    async fn test_delete_by_file() {
        let store = store();
        store
            .upsert_batch(&[
                record("F1", "A", "2", "one"),
                record("F1", "A", "3", "two"),
                record("F2", "A", "2", "three"),
            ])
            .await
            .unwrap();

        assert_eq!(store.delete_by_file("F1").await.unwrap(), 2);
        assert_eq!(store.len().await.unwrap(), 1);
        assert!(!store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_metadata_reads_as_empty() {
        let store = store();
        store.upsert(&record("F1", "A", "2", "text")).await.unwrap();
        store
            .conn
            .lock()
            .execute("UPDATE chunks SET metadata = 'not json'", [])
            .unwrap();

        let matches = store.query("text", 1).await.unwrap();
        assert!(matches[0].metadata.is_empty());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chunks.db");
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashingEmbedder::new(16));

        {
            let store = SqliteChunkStore::new(&path, embedder.clone()).unwrap();
            store.upsert(&record("F1", "C", "9", "kept")).await.unwrap();
        }

        let reopened = SqliteChunkStore::new(&path, embedder).unwrap();
        assert_eq!(reopened.len().await.unwrap(), 1);
    }

    #[test]
    fn test_embedding_blob_roundtrip() {
        let v = vec![0.25f32, -1.5, 3.0];
        assert_eq!(decode_embedding(&encode_embedding(&v)), v);
    }
}
