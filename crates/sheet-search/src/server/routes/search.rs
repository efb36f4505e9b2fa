//! Search and store statistics endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::SearchResponse;

/// Body of `POST /api/search`
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// POST /api/search - Find cells matching a query
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    tracing::info!("Search: \"{}\"", request.query);

    let response = state
        .retriever()
        .search_response(&request.query, state.store(), request.top_k)
        .await;
    Json(response)
}

/// GET /api/stats - Stored chunk count
pub async fn stats(State(state): State<AppState>) -> Result<Json<Value>> {
    let chunks = state.store().len().await?;
    Ok(Json(json!({
        "chunks": chunks,
        "store": state.store().name(),
        "embedder": state.embedder().name(),
        "dimensions": state.embedder().dimensions()
    })))
}
