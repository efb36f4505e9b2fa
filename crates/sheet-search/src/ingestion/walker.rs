//! Cell walking over spreadsheet grids

use serde_json::Value;

use crate::error::Result;
use crate::providers::SpreadsheetDocument;
use crate::types::{CellPosition, CellVisit, SheetInfo};

/// Coerce a provider cell value to text; `None` for cells that must not be indexed.
///
/// Null, empty and whitespace-only strings are skipped. Numbers, booleans and
/// nested values keep their canonical JSON text (so `0` and `false` are indexed).
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Yields one `CellVisit` per non-empty cell of a document, sheet by sheet
pub struct CellWalker;

impl CellWalker {
    /// Lazily visit the non-empty cells of one sheet's grid, row-major
    pub fn sheet_visits<'a>(
        sheet: &'a SheetInfo,
        grid: &'a [Vec<Value>],
    ) -> impl Iterator<Item = CellVisit> + 'a {
        grid.iter().enumerate().flat_map(move |(row_index, row)| {
            row.iter().enumerate().filter_map(move |(col_index, value)| {
                cell_text(value).map(|value| CellVisit {
                    value,
                    tab_name: sheet.title.clone(),
                    sheet_id: sheet.sheet_id,
                    position: CellPosition::new(row_index, col_index),
                })
            })
        })
    }

    /// Visit every sheet of a document in provider order, one bulk read per sheet
    pub async fn walk(document: &dyn SpreadsheetDocument) -> Result<Vec<CellVisit>> {
        let mut visits = Vec::new();
        for sheet in document.sheets() {
            let grid = document.read_all_values(sheet).await?;
            tracing::debug!(
                "Read sheet '{}' (gid {}): {} rows",
                sheet.title,
                sheet.sheet_id,
                grid.len()
            );
            visits.extend(Self::sheet_visits(sheet, &grid));
        }
        Ok(visits)
    }
}
