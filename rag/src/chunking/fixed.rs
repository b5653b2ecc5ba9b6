//! Fixed-size text chunking.

use crate::cleaning::normalize_whitespace;
use crate::error::{RagError, Result};

use super::Chunker;

/// Chunks text into fixed-size character windows with a configurable overlap.
///
/// Whitespace is normalized first. Window `i + 1` starts `overlap` characters before the
/// end of window `i`; the last window is cut at the end of the text. Sizes are counted
/// in Unicode scalar values, so multi-byte text is never split inside a character.
///
/// # Example
///
/// ```rust
/// use quarry_rag::chunking::{Chunker, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(10, 3).unwrap();
/// let chunks = chunker.chunk("abcdefghijklmnopqrstuvwxyz");
/// assert_eq!(chunks, ["abcdefghij", "hijklmnopq", "opqrstuvwx", "vwxyz"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSizeChunker {
    /// Maximum size of each chunk in characters.
    chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    overlap: usize,
}

impl FixedSizeChunker {
    /// Creates a new fixed-size chunker.
    ///
    /// # Errors
    /// Returns [`RagError::InvalidConfig`] if `chunk_size` is zero or
    /// `overlap >= chunk_size`, either of which would keep the window from advancing.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk_size must be positive".into()));
        }
        if overlap >= chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Window size in characters.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap in characters.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self {
            chunk_size: crate::config::DEFAULT_CHUNK_SIZE,
            overlap: crate::config::DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let text = normalize_whitespace(text);
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every character boundary, including the end of the text.
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = boundaries.len() - 1;

        let mut chunks = Vec::with_capacity(char_len.div_ceil(self.chunk_size - self.overlap));
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(char_len);
            chunks.push(text[boundaries[start]..boundaries[end]].to_string());
            if end == char_len {
                break;
            }
            start = end - self.overlap;
        }
        chunks
    }

    fn name(&self) -> &'static str {
        "fixed_size"
    }
}
