//! Configuration for the indexing and retrieval pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming a TOML configuration file
pub const CONFIG_ENV_VAR: &str = "SHEET_SEARCH_CONFIG";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Cell text chunking
    pub chunking: ChunkingConfig,
    /// Indexing behaviour
    pub indexing: IndexingConfig,
    /// Query behaviour
    pub retrieval: RetrievalConfig,
    /// Local chunk store
    pub store: StoreConfig,
    /// Embedding backend used by the chunk store
    pub embeddings: EmbeddingConfig,
    /// Google Drive / Sheets access
    pub google: GoogleConfig,
}

impl SearchConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `SHEET_SEARCH_CONFIG`, or fall back to defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.indexing.parallel_documents == 0 {
            return Err(Error::Config(
                "indexing.parallel_documents must be at least 1".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be positive".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in grapheme clusters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in grapheme clusters
    pub chunk_overlap: usize,
    /// Preferred break points, highest priority first
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: default_separators(),
        }
    }
}

/// Default chunk boundaries: line breaks, sentence ends, clause breaks, then words
pub fn default_separators() -> Vec<String> {
    ["\n", ".", "!", "?", ";", ",", " "]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Added to the 0-based row index to get the displayed row number.
    /// 2 accounts for a header row plus 1-based display.
    pub row_offset: usize,
    /// Documents indexed concurrently within one folder run
    pub parallel_documents: usize,
    /// Delete a document's stored chunks before re-indexing it
    pub prune_before_reindex: bool,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            row_offset: 2,
            parallel_documents: 1,
            prune_before_reindex: false,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of matches requested from the store when the caller gives none
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 10 }
    }
}

/// Chunk store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file holding chunks and their embeddings
    pub storage_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let storage_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheet-search")
            .join("chunks.db");

        Self { storage_path }
    }
}

/// Embedding backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama server (`/api/embeddings`)
    #[default]
    Ollama,
    /// Deterministic feature hashing, no model required
    Hashing,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which embedder the store uses
    pub backend: EmbeddingBackend,
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (768 for nomic-embed-text)
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            timeout_secs: 60,
        }
    }
}

/// Google Drive / Sheets configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Service account JSON key used when a request names none
    pub credentials_path: Option<PathBuf>,
    /// Directory holding keys that requests may name; unset disables request keys
    pub credentials_dir: Option<PathBuf>,
    /// Drive v3 API base URL
    pub drive_api_base: String,
    /// Sheets v4 API base URL
    pub sheets_api_base: String,
    /// Replaces the token URI from the key file (emulators, proxies)
    pub token_uri_override: Option<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            credentials_dir: None,
            drive_api_base: "https://www.googleapis.com/drive/v3".to_string(),
            sheets_api_base: "https://sheets.googleapis.com/v4".to_string(),
            token_uri_override: None,
        }
    }
}

impl GoogleConfig {
    /// Resolve a key file named by a request against `credentials_dir`.
    ///
    /// Only plain relative names are accepted, so a request can never reach a
    /// file outside the directory.
    pub fn request_key_path(&self, requested: &Path) -> Result<PathBuf> {
        let dir = self.credentials_dir.as_ref().ok_or_else(|| {
            Error::authentication("Request credentials are disabled on this server")
        })?;

        let mut components = requested.components().peekable();
        if components.peek().is_none()
            || !components.all(|c| matches!(c, std::path::Component::Normal(_)))
        {
            return Err(Error::authentication(
                "Credentials must name a key file inside the credentials directory",
            ));
        }
        Ok(dir.join(requested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.indexing.row_offset, 2);
        assert_eq!(config.retrieval.top_k, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SearchConfig = toml::from_str(
            r#"
            [chunking]
            chunk_size = 500

            [embeddings]
            backend = "hashing"
            dimensions = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.chunking.separators, default_separators());
        assert_eq!(config.embeddings.backend, EmbeddingBackend::Hashing);
        assert_eq!(config.embeddings.dimensions, 64);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validate_rejects_overlap_not_below_size() {
        let mut config = SearchConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = SearchConfig::default();
        config.indexing.parallel_documents = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet-search.toml");
        std::fs::write(&path, "[indexing]\nrow_offset = 1\n").unwrap();

        let config = SearchConfig::load(&path).unwrap();
        assert_eq!(config.indexing.row_offset, 1);

        std::fs::write(&path, "[chunking]\nchunk_size = 10\nchunk_overlap = 20\n").unwrap();
        assert!(matches!(SearchConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_request_key_path_is_confined() {
        let mut google = GoogleConfig::default();
        assert!(matches!(
            google.request_key_path(Path::new("key.json")),
            Err(Error::Authentication(_))
        ));

        google.credentials_dir = Some(PathBuf::from("/srv/keys"));
        assert_eq!(
            google.request_key_path(Path::new("team/key.json")).unwrap(),
            PathBuf::from("/srv/keys/team/key.json")
        );
        for rejected in ["/etc/passwd", "../key.json", "team/../../key.json", ""] {
            assert!(
                matches!(google.request_key_path(Path::new(rejected)), Err(Error::Authentication(_))),
                "{rejected:?} should be rejected"
            );
        }
    }
}
