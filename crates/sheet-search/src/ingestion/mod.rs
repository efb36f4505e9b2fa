//! Cell walking and text chunking

mod chunker;
mod walker;

pub use chunker::{split, TextChunker};
pub use walker::{cell_text, CellWalker};
