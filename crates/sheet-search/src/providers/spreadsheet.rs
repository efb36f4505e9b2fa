//! Spreadsheet provider traits for folder listing and grid access

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{DocumentRef, SheetInfo};

/// Authenticated access to a cloud drive of spreadsheets
///
/// Implementations:
/// - `GoogleSheetsClient`: Google Drive v3 + Sheets v4
#[async_trait]
pub trait SpreadsheetProvider: Send + Sync {
    /// List the spreadsheet documents directly under a folder.
    ///
    /// All-or-nothing: a failure on any page fails the whole listing.
    async fn list_documents_in_folder(&self, folder_id: &str) -> Result<Vec<DocumentRef>>;

    /// Open a document and load its sheet list
    async fn open(&self, file_id: &str) -> Result<Box<dyn SpreadsheetDocument>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// An opened spreadsheet document
#[async_trait]
pub trait SpreadsheetDocument: Send + Sync {
    /// Provider file id
    fn file_id(&self) -> &str;

    /// Document title
    fn title(&self) -> &str;

    /// Sheets in provider order
    fn sheets(&self) -> &[SheetInfo];

    /// Find a sheet by its tab title
    fn sheet_by_title(&self, title: &str) -> Option<&SheetInfo> {
        self.sheets().iter().find(|s| s.title == title)
    }

    /// Read the whole grid of a sheet in one request, row-major
    async fn read_all_values(&self, sheet: &SheetInfo) -> Result<Vec<Vec<Value>>>;

    /// Read an A1 range (`"B2"`, `"A1:C5"`) of the named sheet
    async fn read_range(&self, sheet_title: &str, range: &str) -> Result<Vec<Vec<Value>>>;

    /// Write values into an A1 range of the named sheet
    async fn write_range(&self, sheet_title: &str, range: &str, values: Vec<Vec<Value>>) -> Result<()>;
}
