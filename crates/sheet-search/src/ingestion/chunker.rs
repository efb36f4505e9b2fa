//! Sliding-window text chunking with boundary preference

use unicode_segmentation::UnicodeSegmentation;

use crate::config::{default_separators, ChunkingConfig};

/// Text chunker with configurable size and overlap.
///
/// Lengths are counted in grapheme clusters. Each chunk after the first starts
/// exactly `overlap` graphemes before the end of the previous one, so dropping
/// that prefix from every later chunk and concatenating gives back the input.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk length
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
    /// Break points in priority order
    separators: Vec<String>,
}

impl TextChunker {
    /// Create a new chunker with the default separators.
    ///
    /// A zero size is treated as 1 and an overlap that does not fit below the
    /// size is clamped to `size - 1`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
            separators: default_separators(),
        }
    }

    /// Create from chunking configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap).with_separators(config.separators.clone())
    }

    /// Replace the break points
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into bounded, overlapping segments
    pub fn split(&self, text: &str) -> Vec<String> {
        let units: Vec<&str> = text.graphemes(true).collect();
        if units.is_empty() {
            return Vec::new();
        }
        if units.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        loop {
            let hard_end = (start + self.chunk_size).min(units.len());
            let end = if hard_end == units.len() {
                hard_end
            } else {
                // Never end before start + overlap + 1, otherwise the window would stall
                let min_end = (start + self.overlap + 1).max(start + self.chunk_size / 2);
                self.boundary_end(&units, min_end, hard_end)
            };

            chunks.push(units[start..end].concat());

            if end == units.len() {
                break;
            }
            start = end - self.overlap;
        }

        chunks
    }

    /// Latest end position in `[min_end, hard_end]` that follows the highest-priority separator
    fn boundary_end(&self, units: &[&str], min_end: usize, hard_end: usize) -> usize {
        for separator in &self.separators {
            if let Some(end) = (min_end..=hard_end)
                .rev()
                .find(|&end| units[end - 1] == separator.as_str())
            {
                return end;
            }
        }
        hard_end
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

/// Split `text` into segments of at most `max_size` graphemes overlapping by `overlap`
pub fn split(text: &str, max_size: usize, overlap: usize) -> Vec<String> {
    TextChunker::new(max_size, overlap).split(text)
}
