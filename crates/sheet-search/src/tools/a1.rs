//! A1 notation (`B2`, `A1:C5`)

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::{column_index, column_letter};

/// A single cell reference, 0-based internally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row_index: usize,
    pub col_index: usize,
}

impl CellRef {
    pub fn new(row_index: usize, col_index: usize) -> Self {
        Self {
            row_index,
            col_index,
        }
    }

    /// Parse `B2` style notation (column letters, then a 1-based row)
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let split = text
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| Error::invalid_argument(format!("Cell reference has no row: {:?}", text)))?;
        let (letters, digits) = text.split_at(split);

        let col_index = column_index(letters).ok_or_else(|| {
            Error::invalid_argument(format!("Invalid column in cell reference: {:?}", text))
        })?;
        let row: usize = digits
            .parse()
            .map_err(|_| Error::invalid_argument(format!("Invalid row in cell reference: {:?}", text)))?;
        if row == 0 {
            return Err(Error::invalid_argument(format!(
                "Rows start at 1 in cell reference: {:?}",
                text
            )));
        }

        Ok(Self::new(row - 1, col_index))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.col_index), self.row_index + 1)
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range, corners normalised so `start` is top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct A1Range {
    pub start: CellRef,
    pub end: CellRef,
}

impl A1Range {
    /// Parse `A1:C5` or a single cell `B2`
    pub fn parse(text: &str) -> Result<Self> {
        let (first, second) = match text.split_once(':') {
            Some((a, b)) => (CellRef::parse(a)?, CellRef::parse(b)?),
            None => {
                let cell = CellRef::parse(text)?;
                (cell, cell)
            }
        };

        Ok(Self {
            start: CellRef::new(
                first.row_index.min(second.row_index),
                first.col_index.min(second.col_index),
            ),
            end: CellRef::new(
                first.row_index.max(second.row_index),
                first.col_index.max(second.col_index),
            ),
        })
    }

    pub fn rows(&self) -> usize {
        self.end.row_index - self.start.row_index + 1
    }

    pub fn cols(&self) -> usize {
        self.end.col_index - self.start.col_index + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

impl FromStr for A1Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        assert_eq!(CellRef::parse("A1").unwrap(), CellRef::new(0, 0));
        assert_eq!(CellRef::parse("b2").unwrap(), CellRef::new(1, 1));
        assert_eq!(CellRef::parse("AA10").unwrap(), CellRef::new(9, 26));
        assert_eq!(CellRef::parse("AA10").unwrap().to_string(), "AA10");
    }

    #[test]
    fn test_parse_cell_rejects_garbage() {
        for bad in ["", "12", "A", "A0", "1A", "A-1", "Ä1"] {
            assert!(
                matches!(CellRef::parse(bad), Err(Error::InvalidArgument(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_range() {
        let range = A1Range::parse("B2:D5").unwrap();
        assert_eq!(range.start, CellRef::new(1, 1));
        assert_eq!(range.end, CellRef::new(4, 3));
        assert_eq!((range.rows(), range.cols()), (4, 3));
        assert_eq!(range.to_string(), "B2:D5");

        let reversed = A1Range::parse("D5:B2").unwrap();
        assert_eq!(reversed, range);

        let single: A1Range = "C3".parse().unwrap();
        assert!(single.is_single_cell());
        assert_eq!(single.to_string(), "C3");
    }
}
