//! Core types for spreadsheet indexing and retrieval

pub mod cell;
pub mod chunk;
pub mod document;
pub mod report;
pub mod response;

pub use cell::{column_index, column_letter, CellPosition, CellVisit};
pub use chunk::{ChunkMetadata, ChunkRecord, MetadataMap};
pub use document::{DocumentRef, SheetInfo};
pub use report::{DocumentOutcome, FileIndexReport, FolderIndexReport, IndexDetails, IndexError};
pub use response::{ResultRecord, SearchResponse};
