//! Chunk records persisted in the vector store

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata mapping as held by the vector store
pub type MetadataMap = BTreeMap<String, String>;

/// Positional metadata stored alongside every chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub file_name: String,
    pub file_id: String,
    pub tab_name: String,
    /// Sheet id in string form so link construction never depends on number formatting
    pub sheet_id: String,
    /// Column letters
    pub col: String,
    /// Displayed row number
    pub row: String,
}

impl ChunkMetadata {
    /// Flatten into the store's string mapping
    pub fn to_map(&self) -> MetadataMap {
        let mut map = MetadataMap::new();
        map.insert("file_name".to_string(), self.file_name.clone());
        map.insert("file_id".to_string(), self.file_id.clone());
        map.insert("tab_name".to_string(), self.tab_name.clone());
        map.insert("sheet_id".to_string(), self.sheet_id.clone());
        map.insert("col".to_string(), self.col.clone());
        map.insert("row".to_string(), self.row.clone());
        map
    }
}

/// Unit written to the vector store: one segment of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// `{file_id}_{sheet_id}_{col}{row}_{chunk_index}`
    pub id: String,
    /// Segment text
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl ChunkRecord {
    /// Build a record, deriving its id from position and chunk sequence number
    pub fn new(text: String, metadata: ChunkMetadata, chunk_index: usize) -> Self {
        let id = Self::chunk_id(
            &metadata.file_id,
            &metadata.sheet_id,
            &metadata.col,
            &metadata.row,
            chunk_index,
        );
        Self { id, text, metadata }
    }

    /// Deterministic composite key for a cell segment
    pub fn chunk_id(file_id: &str, sheet_id: &str, col: &str, row: &str, chunk_index: usize) -> String {
        format!("{}_{}_{}{}_{}", file_id, sheet_id, col, row, chunk_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ChunkMetadata {
        ChunkMetadata {
            file_name: "Budget".to_string(),
            file_id: "F1".to_string(),
            tab_name: "Q1".to_string(),
            sheet_id: "42".to_string(),
            col: "B".to_string(),
            row: "3".to_string(),
        }
    }

    #[test]
    fn test_chunk_id() {
        let record = ChunkRecord::new("hello".to_string(), metadata(), 0);
        assert_eq!(record.id, "F1_42_B3_0");

        let next = ChunkRecord::new("world".to_string(), metadata(), 1);
        assert_eq!(next.id, "F1_42_B3_1");
    }

    #[test]
    fn test_metadata_map_has_all_fields() {
        let map = metadata().to_map();
        assert_eq!(map.len(), 6);
        assert_eq!(map["sheet_id"], "42");
        assert_eq!(map["col"], "B");
        assert_eq!(map["row"], "3");
    }
}
