//! Cell positions and A1-style column letters

use serde::{Deserialize, Serialize};

/// Convert a 0-based column index to its letter sequence (0 -> A, 25 -> Z, 26 -> AA)
pub fn column_letter(col_index: usize) -> String {
    let mut n = col_index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

/// Convert a letter sequence back to a 0-based column index (case-insensitive)
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    let mut col: usize = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        let v = (b.to_ascii_uppercase() - b'A') as usize + 1;
        col = col.checked_mul(26)?.checked_add(v)?;
    }
    Some(col - 1)
}

/// 0-based position of a cell within a sheet's grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    pub row_index: usize,
    pub col_index: usize,
}

impl CellPosition {
    pub fn new(row_index: usize, col_index: usize) -> Self {
        Self {
            row_index,
            col_index,
        }
    }

    /// Column letters for display and links
    pub fn column(&self) -> String {
        column_letter(self.col_index)
    }

    /// Displayed row number under the given offset
    pub fn display_row(&self, row_offset: usize) -> usize {
        self.row_index + row_offset
    }
}

/// One non-empty cell yielded by the cell walker
#[derive(Debug, Clone, PartialEq)]
pub struct CellVisit {
    /// Cell value coerced to text
    pub value: String,
    /// Sheet display title
    pub tab_name: String,
    /// Provider-assigned sheet id
    pub sheet_id: i64,
    /// Position in the sheet grid
    pub position: CellPosition,
}
