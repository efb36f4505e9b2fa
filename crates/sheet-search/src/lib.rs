//! sheet-search: semantic search over spreadsheet cells
//!
//! Walks every cell of every sheet in a Drive folder, chunks cell text into a
//! similarity store, and answers free-text queries with deep links back to the
//! matching cell. A small toolkit exposes cell reads and writes to an agent.

pub mod config;
pub mod error;
pub mod indexing;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod tools;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::SearchConfig;
pub use error::{Error, Result};
pub use indexing::{FolderCrawler, Indexer};
pub use ingestion::{CellWalker, TextChunker};
pub use retrieval::{cell_link, Retriever};
pub use types::{
    ChunkRecord, DocumentRef, FileIndexReport, FolderIndexReport, ResultRecord, SearchResponse,
};
