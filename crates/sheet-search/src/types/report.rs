//! Indexing outcomes and the reports returned to callers

use serde::{Deserialize, Serialize};

/// Result of indexing one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Every sheet was read and every chunk written
    Indexed { file_name: String, chunks: usize },
    /// Indexing stopped; writes issued before the failure stay in the store
    Failed { file_name: String, reason: String },
}

impl DocumentOutcome {
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed { .. })
    }

    pub fn file_name(&self) -> &str {
        match self {
            Self::Indexed { file_name, .. } | Self::Failed { file_name, .. } => file_name,
        }
    }
}

/// Per-document failure entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexError {
    pub file_name: String,
    pub error: String,
}

/// Counts accumulated over one folder run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDetails {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<IndexError>,
    /// Chunks written by the successful documents
    #[serde(default)]
    pub chunks_indexed: usize,
}

impl IndexDetails {
    /// Fold document outcomes into counts, keeping error order
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = DocumentOutcome>) -> Self {
        let mut details = Self::default();
        for outcome in outcomes {
            details.total += 1;
            match outcome {
                DocumentOutcome::Indexed { chunks, .. } => {
                    details.successful += 1;
                    details.chunks_indexed += chunks;
                }
                DocumentOutcome::Failed { file_name, reason } => {
                    details.failed += 1;
                    details.errors.push(IndexError {
                        file_name,
                        error: reason,
                    });
                }
            }
        }
        details
    }
}

/// Report for a whole folder run; always produced, even when every document fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderIndexReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<IndexDetails>,
}

impl FolderIndexReport {
    /// The folder was listed and every document attempted
    pub fn completed(details: IndexDetails) -> Self {
        Self {
            success: true,
            message: format!(
                "Indexed {}/{} files successfully",
                details.successful, details.total
            ),
            details: Some(details),
        }
    }

    /// The run could not start (bad credentials, listing failure)
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: None,
        }
    }
}

/// Report for indexing a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIndexReport {
    pub success: bool,
    pub message: String,
}

impl From<DocumentOutcome> for FileIndexReport {
    fn from(outcome: DocumentOutcome) -> Self {
        match outcome {
            DocumentOutcome::Indexed { file_name, chunks } => Self {
                success: true,
                message: format!("Indexed file {} ({} chunks)", file_name, chunks),
            },
            DocumentOutcome::Failed { file_name, reason } => Self {
                success: false,
                message: format!("Failed to index file {}: {}", file_name, reason),
            },
        }
    }
}
