//! API routes for the search server

pub mod index;
pub mod search;

use axum::{
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Indexing
        .route("/index/folder", post(index::index_folder))
        .route("/index/file", post(index::index_file))
        // Retrieval
        .route("/search", post(search::search))
        .route("/stats", get(search::stats))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "sheet-search",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Semantic search over spreadsheet cells with links back to the source cell",
        "endpoints": {
            "POST /api/index/folder": "Index every spreadsheet in a Drive folder",
            "POST /api/index/file": "Index a single spreadsheet",
            "POST /api/search": "Search indexed cells",
            "GET /api/stats": "Stored chunk count"
        }
    }))
}
