//! Shared state for the HTTP server

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::indexing::Indexer;
use crate::providers::{
    embedder_from_config, sheets_provider_from_key, ChunkStore, EmbeddingProvider,
    SpreadsheetProvider, SqliteChunkStore,
};
use crate::retrieval::Retriever;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SearchConfig,
    /// Opened once at startup and reused for every request
    store: Arc<dyn ChunkStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    /// Provider built from the configured credentials, if any
    provider: Option<Arc<dyn SpreadsheetProvider>>,
    indexer: Indexer,
    retriever: Retriever,
}

impl AppState {
    /// Open the chunk store and connect the configured providers
    pub async fn new(config: SearchConfig) -> Result<Self> {
        let embedder = embedder_from_config(&config.embeddings)?;
        tracing::info!(
            "Embedder: {} ({} dimensions)",
            embedder.name(),
            embedder.dimensions()
        );

        let store: Arc<dyn ChunkStore> = Arc::new(SqliteChunkStore::new(
            &config.store.storage_path,
            Arc::clone(&embedder),
        )?);
        tracing::info!(
            "Chunk store opened at {} ({} chunks)",
            config.store.storage_path.display(),
            store.len().await?
        );

        let provider = match config.google.credentials_path {
            Some(ref path) => match sheets_provider_from_key(path, &config.google) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    tracing::warn!("Spreadsheet provider unavailable: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Self::with_components(config, store, embedder, provider))
    }

    /// Assemble state from already-built components
    pub fn with_components(
        config: SearchConfig,
        store: Arc<dyn ChunkStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        provider: Option<Arc<dyn SpreadsheetProvider>>,
    ) -> Self {
        let indexer = Indexer::from_config(&config);
        let retriever = Retriever::from_config(&config);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                embedder,
                provider,
                indexer,
                retriever,
            }),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &dyn ChunkStore {
        self.inner.store.as_ref()
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    pub fn indexer(&self) -> &Indexer {
        &self.inner.indexer
    }

    pub fn retriever(&self) -> &Retriever {
        &self.inner.retriever
    }

    /// Key file named by a request, confined to `google.credentials_dir`
    pub fn request_key_path(&self, requested: &Path) -> Result<PathBuf> {
        self.inner.config.google.request_key_path(requested)
    }

    /// Provider for a request: request credentials win over the configured ones
    pub fn provider_for(&self, credentials_path: Option<&Path>) -> Result<Arc<dyn SpreadsheetProvider>> {
        match credentials_path {
            Some(requested) => {
                let path = self.request_key_path(requested)?;
                sheets_provider_from_key(&path, &self.inner.config.google)
            }
            None => self.inner.provider.clone().ok_or_else(|| {
                Error::authentication("No credentials supplied and none configured")
            }),
        }
    }
}
