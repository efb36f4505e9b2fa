//! Provider abstractions for spreadsheets, embeddings and chunk storage
//!
//! This module provides trait-based abstractions so the pipeline can run
//! against Google Sheets or an in-process test double, and store chunks in any
//! similarity store.

pub mod embedding;
pub mod hashing;
pub mod ollama;
pub mod spreadsheet;
pub mod sqlite_store;
pub mod vector_store;

#[cfg(feature = "google")]
pub mod google;

use std::path::Path;
use std::sync::Arc;

use crate::config::{EmbeddingBackend, EmbeddingConfig, GoogleConfig};
use crate::error::Result;

pub use embedding::EmbeddingProvider;
pub use hashing::HashingEmbedder;
pub use ollama::OllamaEmbedder;
pub use spreadsheet::{SpreadsheetDocument, SpreadsheetProvider};
pub use sqlite_store::SqliteChunkStore;
pub use vector_store::{ChunkStore, StoreMatch};

/// Build the embedder selected by configuration
pub fn embedder_from_config(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder: Arc<dyn EmbeddingProvider> = match config.backend {
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::new(config)?),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)),
    };
    Ok(embedder)
}

/// Google Sheets provider authenticated from a service account key file
#[cfg(feature = "google")]
pub fn sheets_provider_from_key(
    credentials_path: &Path,
    config: &GoogleConfig,
) -> Result<Arc<dyn SpreadsheetProvider>> {
    let client = google::GoogleSheetsClient::from_credentials(credentials_path, config)?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "google"))]
pub fn sheets_provider_from_key(
    credentials_path: &Path,
    _config: &GoogleConfig,
) -> Result<Arc<dyn SpreadsheetProvider>> {
    Err(crate::error::Error::Config(format!(
        "Cannot use credentials {}: built without the google feature",
        credentials_path.display()
    )))
}
