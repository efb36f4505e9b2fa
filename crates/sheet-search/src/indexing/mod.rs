//! Folder discovery and document indexing

mod crawler;
mod indexer;

pub use crawler::FolderCrawler;
pub use indexer::Indexer;
