//! Spreadsheet document and sheet references

use serde::{Deserialize, Serialize};

/// A spreadsheet discovered in a drive folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Provider-assigned file id
    pub id: String,
    /// Human-readable file name
    pub name: String,
}

impl DocumentRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One tab of a spreadsheet document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    /// Provider-assigned sheet id, unique within the document (the `gid` in links)
    pub sheet_id: i64,
    /// Display title of the tab
    pub title: String,
    /// Position of the tab in the document
    pub index: u32,
}

impl SheetInfo {
    pub fn new(sheet_id: i64, title: impl Into<String>, index: u32) -> Self {
        Self {
            sheet_id,
            title: title.into(),
            index,
        }
    }
}
