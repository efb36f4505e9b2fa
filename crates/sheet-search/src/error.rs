//! Error types for the indexing and retrieval pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for sheet-search operations
pub type Result<T> = std::result::Result<T, Error>;

/// Sheet search errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid or missing credentials for the spreadsheet provider
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Transport or API failure talking to the spreadsheet provider
    #[error("Spreadsheet provider error: {0}")]
    Provider(String),

    /// Vector store write failed
    #[error("Vector store write failed: {0}")]
    StoreWrite(String),

    /// Vector store query failed
    #[error("Vector store query failed: {0}")]
    StoreQuery(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Bad caller input (folder id, A1 notation, tool arguments)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Create a store write error
    pub fn store_write(message: impl Into<String>) -> Self {
        Self::StoreWrite(message.into())
    }

    /// Create a store query error
    pub fn store_query(message: impl Into<String>) -> Self {
        Self::StoreQuery(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::Config(_) => (StatusCode::BAD_REQUEST, "config_error"),
            Error::Authentication(_) => (StatusCode::UNAUTHORIZED, "authentication_error"),
            Error::Provider(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
            Error::StoreWrite(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_write_error"),
            Error::StoreQuery(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_query_error"),
            Error::Embedding(_) => (StatusCode::SERVICE_UNAVAILABLE, "embedding_error"),
            Error::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
