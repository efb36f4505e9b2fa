//! Search results returned to callers

use serde::{Deserialize, Serialize};

/// One display-ready search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Matched chunk text
    pub text: String,
    pub file_id: String,
    pub file_name: String,
    pub tab_name: String,
    pub sheet_id: String,
    pub col: String,
    pub row: String,
    /// Deep link to the cell
    pub link: String,
    /// Similarity score reported by the store
    pub score: f32,
}

/// Search result set with an error indicator instead of a failure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ResultRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn ok(results: Vec<ResultRecord>) -> Self {
        Self {
            results,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            error: Some(error.into()),
        }
    }
}
