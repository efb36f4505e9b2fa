//! Cell-level indexing of spreadsheet documents into a chunk store

use futures::stream::{self, StreamExt};
use std::path::Path;

use crate::config::{GoogleConfig, SearchConfig};
use crate::error::Result;
use crate::ingestion::{CellWalker, TextChunker};
use crate::providers::{sheets_provider_from_key, ChunkStore, SpreadsheetProvider};
use crate::types::{
    CellVisit, ChunkMetadata, ChunkRecord, DocumentOutcome, DocumentRef, FileIndexReport,
    FolderIndexReport, IndexDetails,
};

use super::crawler::FolderCrawler;

/// Turns spreadsheet cells into chunk records and writes them to a store.
///
/// Each document is indexed independently: a failure is recorded in its
/// outcome and never stops the rest of a folder run. Writes issued before a
/// failure stay in the store.
#[derive(Debug, Clone)]
pub struct Indexer {
    chunker: TextChunker,
    row_offset: usize,
    parallel_documents: usize,
    prune_before_reindex: bool,
}

impl Indexer {
    pub fn new(chunker: TextChunker) -> Self {
        Self {
            chunker,
            row_offset: 2,
            parallel_documents: 1,
            prune_before_reindex: false,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(TextChunker::from_config(&config.chunking))
            .with_row_offset(config.indexing.row_offset)
            .with_parallel_documents(config.indexing.parallel_documents)
            .with_prune_before_reindex(config.indexing.prune_before_reindex)
    }

    /// Offset added to the 0-based row index for the displayed row number
    pub fn with_row_offset(mut self, row_offset: usize) -> Self {
        self.row_offset = row_offset;
        self
    }

    pub fn with_parallel_documents(mut self, parallel_documents: usize) -> Self {
        self.parallel_documents = parallel_documents.max(1);
        self
    }

    pub fn with_prune_before_reindex(mut self, prune: bool) -> Self {
        self.prune_before_reindex = prune;
        self
    }

    /// Chunk records for one visited cell, in chunk order
    pub fn records_for_visit(&self, document: &DocumentRef, visit: &CellVisit) -> Vec<ChunkRecord> {
        let metadata = ChunkMetadata {
            file_name: document.name.clone(),
            file_id: document.id.clone(),
            tab_name: visit.tab_name.clone(),
            sheet_id: visit.sheet_id.to_string(),
            col: visit.position.column(),
            row: visit.position.display_row(self.row_offset).to_string(),
        };

        self.chunker
            .split(&visit.value)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| ChunkRecord::new(text, metadata.clone(), chunk_index))
            .collect()
    }

    async fn write_document(
        &self,
        provider: &dyn SpreadsheetProvider,
        store: &dyn ChunkStore,
        document: &DocumentRef,
    ) -> Result<usize> {
        let handle = provider.open(&document.id).await?;

        // Every sheet is read before the store is touched, so a failed read
        // leaves the previous index of this document in place
        let records: Vec<ChunkRecord> = CellWalker::walk(handle.as_ref())
            .await?
            .iter()
            .flat_map(|visit| self.records_for_visit(document, visit))
            .collect();

        if self.prune_before_reindex {
            let removed = store.delete_by_file(&document.id).await?;
            tracing::debug!("Pruned {} stale chunks of {}", removed, document.name);
        }

        store.upsert_batch(&records).await?;
        tracing::debug!(
            "Wrote {} chunks from {} sheets of {}",
            records.len(),
            handle.sheets().len(),
            document.name
        );
        Ok(records.len())
    }

    /// Index every sheet of one document
    pub async fn index_document(
        &self,
        provider: &dyn SpreadsheetProvider,
        store: &dyn ChunkStore,
        document: &DocumentRef,
    ) -> DocumentOutcome {
        match self.write_document(provider, store, document).await {
            Ok(chunks) => {
                tracing::info!("Indexed {} ({} chunks)", document.name, chunks);
                DocumentOutcome::Indexed {
                    file_name: document.name.clone(),
                    chunks,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to index {} ({}): {}", document.name, document.id, e);
                DocumentOutcome::Failed {
                    file_name: document.name.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Index every spreadsheet directly under a folder
    pub async fn index_folder(
        &self,
        provider: &dyn SpreadsheetProvider,
        store: &dyn ChunkStore,
        folder_id: &str,
    ) -> FolderIndexReport {
        let documents = match FolderCrawler::new(provider).list_documents(folder_id).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!("Listing folder {} failed: {}", folder_id, e);
                return FolderIndexReport::failed(format!("Failed to index folder: {}", e));
            }
        };

        let outcomes: Vec<DocumentOutcome> = stream::iter(documents)
            .map(|document| async move { self.index_document(provider, store, &document).await })
            .buffered(self.parallel_documents)
            .collect()
            .await;

        let details = IndexDetails::from_outcomes(outcomes);
        tracing::info!(
            "Folder {} indexed: {}/{} files, {} chunks",
            folder_id,
            details.successful,
            details.total,
            details.chunks_indexed
        );
        FolderIndexReport::completed(details)
    }

    /// Index a single file, e.g. one newly added to a watched folder
    pub async fn index_file(
        &self,
        provider: &dyn SpreadsheetProvider,
        store: &dyn ChunkStore,
        document: &DocumentRef,
    ) -> FileIndexReport {
        self.index_document(provider, store, document).await.into()
    }

    /// Authenticate from a service account key and index a folder.
    ///
    /// A key that cannot be loaded fails the whole run, like a failed listing.
    pub async fn index_folder_with_credentials(
        &self,
        credentials_path: &Path,
        google: &GoogleConfig,
        store: &dyn ChunkStore,
        folder_id: &str,
    ) -> FolderIndexReport {
        match sheets_provider_from_key(credentials_path, google) {
            Ok(provider) => self.index_folder(provider.as_ref(), store, folder_id).await,
            Err(e) => {
                tracing::error!("Spreadsheet authentication failed: {}", e);
                FolderIndexReport::failed(format!("Failed to index folder: {}", e))
            }
        }
    }
}

impl Default for Indexer {
    fn default() -> Self {
        Self::new(TextChunker::default())
    }
}
