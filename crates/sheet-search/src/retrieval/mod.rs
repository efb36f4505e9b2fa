//! Semantic search over indexed cells

mod search;

pub use search::{cell_link, Retriever};
