//! Query-time mapping from store matches to linked cell results

use crate::config::SearchConfig;
use crate::error::Result;
use crate::providers::{ChunkStore, StoreMatch};
use crate::types::{ResultRecord, SearchResponse};

/// Deep link opening a spreadsheet at one cell
pub fn cell_link(file_id: &str, sheet_id: &str, col: &str, row: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/edit#gid={}&range={}{}",
        file_id, sheet_id, col, row
    )
}

fn field(m: &StoreMatch, key: &str) -> String {
    match m.metadata.get(key) {
        Some(value) => value.clone(),
        None => {
            tracing::debug!("Match {} has no '{}' metadata", m.id, key);
            String::new()
        }
    }
}

/// Semantic search over indexed cells.
///
/// Ranking belongs to the store; results keep the store's order.
#[derive(Debug, Clone)]
pub struct Retriever {
    top_k: usize,
}

impl Retriever {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.retrieval.top_k)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Map one raw match to a result; missing metadata becomes `""`
    pub fn to_result(m: StoreMatch) -> ResultRecord {
        let file_id = field(&m, "file_id");
        let file_name = field(&m, "file_name");
        let tab_name = field(&m, "tab_name");
        let sheet_id = field(&m, "sheet_id");
        let col = field(&m, "col");
        let row = field(&m, "row");
        let link = cell_link(&file_id, &sheet_id, &col, &row);

        ResultRecord {
            text: m.text,
            file_id,
            file_name,
            tab_name,
            sheet_id,
            col,
            row,
            link,
            score: m.score,
        }
    }

    /// Search for cells matching `query`.
    ///
    /// A blank query returns no results without contacting the store.
    pub async fn search(
        &self,
        query: &str,
        store: &dyn ChunkStore,
        top_k: Option<usize>,
    ) -> Result<Vec<ResultRecord>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let top_k = top_k.unwrap_or(self.top_k);
        let matches = store.query(query, top_k).await?;
        tracing::debug!("Query {:?} matched {} chunks in {}", query, matches.len(), store.name());

        Ok(matches.into_iter().map(Self::to_result).collect())
    }

    /// Like `search`, but a store failure becomes an empty result with an error message
    pub async fn search_response(
        &self,
        query: &str,
        store: &dyn ChunkStore,
        top_k: Option<usize>,
    ) -> SearchResponse {
        match self.search(query, store, top_k).await {
            Ok(results) => SearchResponse::ok(results),
            Err(e) => {
                tracing::error!("Search failed: {}", e);
                SearchResponse::failed(e.to_string())
            }
        }
    }
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new(10)
    }
}
