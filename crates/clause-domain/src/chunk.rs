//! Chunk module - bounded windows of a document's combined text

/// A half-open `[start, end)` window into a document's combined text,
/// together with the materialized substring.
///
/// Consecutive chunks produced by the chunker may overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Start offset (inclusive) in the combined text
    pub start: usize,
    /// End offset (exclusive) in the combined text
    pub end: usize,
    /// `combined_text[start..end]`
    pub text: String,
}

impl Chunk {
    /// Create a chunk by slicing `source`.
    ///
    /// Both offsets must lie on `char` boundaries of `source`.
    pub fn from_source(source: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            text: source[start..end].to_string(),
        }
    }

    /// Length of the chunk in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the chunk covers no text
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether this chunk shares at least one byte with `[start, end)`
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}
