//! Separator-aware, overlapping text chunking for large documents

use crate::config::ExtractorConfig;
use clause_domain::Chunk;

/// Cut points in priority order: paragraph, line, sentence, clause, list, word
const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "; ", ", ", " "];

/// A separator only qualifies if it lands this far into the window
const MIN_CUT_FRACTION: f64 = 0.6;

/// Splits combined document text into overlapping windows.
///
/// Output chunks are ordered, cover `[0, len)` without gaps, and are
/// deterministic for a given input.
#[derive(Debug, Clone)]
pub struct TextChunker {
    max_chunk_size: usize,
    overlap_chars: usize,
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(max_chunk_size: usize, overlap_fraction: f64) -> Self {
        let max_chunk_size = max_chunk_size.max(1);
        Self {
            max_chunk_size,
            overlap_chars: (max_chunk_size as f64 * overlap_fraction).floor() as usize,
        }
    }

    /// Create a chunker from extractor settings
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.max_chunk_size, config.overlap_fraction)
    }

    /// Chunk the given text
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let len = text.len();
        if len <= self.max_chunk_size {
            return vec![Chunk::from_source(text, 0, len)];
        }

        let mut chunks = Vec::new();
        let mut cursor = 0;

        while cursor < len {
            let end = self.cut_point(text, cursor);
            chunks.push(Chunk::from_source(text, cursor, end));
            if end >= len {
                break;
            }

            // The cursor must strictly advance or we never terminate.
            let next = floor_char_boundary(text, end.saturating_sub(self.overlap_chars));
            cursor = if next > cursor { next } else { end };
        }

        chunks
    }

    /// End offset of the chunk starting at `cursor`
    fn cut_point(&self, text: &str, cursor: usize) -> usize {
        let len = text.len();
        let max_end = (cursor + self.max_chunk_size).min(len);
        if max_end == len {
            return len;
        }

        let max_end = floor_char_boundary(text, max_end);
        let min_end = cursor + (self.max_chunk_size as f64 * MIN_CUT_FRACTION) as usize;
        let window = &text[cursor..max_end];

        for separator in SEPARATORS {
            if let Some(idx) = window.rfind(separator) {
                if cursor + idx >= min_end {
                    return cursor + idx + separator.len();
                }
            }
        }

        // Hard cut. A single character wider than the window still has to
        // be emitted whole.
        if max_end > cursor {
            max_end
        } else {
            ceil_char_boundary(text, cursor + 1)
        }
    }
}

/// Largest char boundary `<= index`
pub(crate) fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary `>= index`
pub(crate) fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}
