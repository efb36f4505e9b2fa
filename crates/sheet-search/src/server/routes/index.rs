//! Indexing endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use std::path::PathBuf;

use crate::server::state::AppState;
use crate::types::{DocumentRef, FileIndexReport, FolderIndexReport};

/// Body of `POST /api/index/folder`
#[derive(Debug, Deserialize)]
pub struct IndexFolderRequest {
    pub folder_id: String,
    /// Key file name inside `google.credentials_dir`
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

/// Body of `POST /api/index/file`
#[derive(Debug, Deserialize)]
pub struct IndexFileRequest {
    /// Folder the file was found in, for logging only
    #[serde(default)]
    pub folder_id: Option<String>,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

/// POST /api/index/folder - Index every spreadsheet in a folder
pub async fn index_folder(
    State(state): State<AppState>,
    Json(request): Json<IndexFolderRequest>,
) -> Json<FolderIndexReport> {
    tracing::info!("Index folder request: {}", request.folder_id);

    let store = state.store();
    let report = match request.credentials_path {
        Some(ref requested) => match state.request_key_path(requested) {
            Ok(key_path) => {
                state
                    .indexer()
                    .index_folder_with_credentials(
                        &key_path,
                        &state.config().google,
                        store,
                        &request.folder_id,
                    )
                    .await
            }
            Err(e) => FolderIndexReport::failed(format!("Failed to index folder: {}", e)),
        },
        None => match state.provider_for(None) {
            Ok(provider) => {
                state
                    .indexer()
                    .index_folder(provider.as_ref(), store, &request.folder_id)
                    .await
            }
            Err(e) => FolderIndexReport::failed(format!("Failed to index folder: {}", e)),
        },
    };
    Json(report)
}

/// POST /api/index/file - Index one spreadsheet
pub async fn index_file(
    State(state): State<AppState>,
    Json(request): Json<IndexFileRequest>,
) -> Json<FileIndexReport> {
    tracing::info!(
        "Index file request: {} ({}) in folder {}",
        request.name,
        request.id,
        request.folder_id.as_deref().unwrap_or("-")
    );

    let provider = match state.provider_for(request.credentials_path.as_deref()) {
        Ok(provider) => provider,
        Err(e) => {
            return Json(FileIndexReport {
                success: false,
                message: format!("Failed to index file {}: {}", request.name, e),
            })
        }
    };

    let document = DocumentRef::new(request.id, request.name);
    let report = state
        .indexer()
        .index_file(provider.as_ref(), state.store(), &document)
        .await;
    Json(report)
}
