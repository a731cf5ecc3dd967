//! Result types for document extraction

use clause_domain::Extraction;
use std::collections::BTreeMap;

/// Outcome of extracting one document (or one batch of its pages)
#[derive(Debug, Clone, Default)]
pub struct DocumentExtraction {
    /// Document identifier
    pub document_id: String,

    /// One entry per input page, keyed by page number
    pub pages: BTreeMap<u32, PageExtraction>,

    /// Chunks whose classification failed
    pub chunk_failures: Vec<ChunkFailure>,

    /// Number of chunks sent to the classifier
    pub chunks_total: usize,
}

impl DocumentExtraction {
    /// Pages not covered by any successfully classified chunk
    pub fn failed_pages(&self) -> Vec<u32> {
        self.pages
            .values()
            .filter(|p| !p.complete)
            .map(|p| p.page)
            .collect()
    }

    /// Total extractions across all pages
    pub fn total_extractions(&self) -> usize {
        self.pages.values().map(|p| p.extractions.len()).sum()
    }
}

/// Extractions attributed to one page, in page-local coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PageExtraction {
    /// Page number
    pub page: u32,

    /// Page text the offsets refer to
    pub text: String,

    /// Deduplicated extractions, located ones first
    pub extractions: Vec<Extraction>,

    /// Whether the page is blank or at least one chunk touching it was
    /// classified successfully. Incomplete pages must not be recorded as done.
    pub complete: bool,
}

impl PageExtraction {
    /// Distinct labels on this page, in extraction order
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for extraction in &self.extractions {
            if !labels.contains(&extraction.label.as_str()) {
                labels.push(&extraction.label);
            }
        }
        labels
    }
}

/// Information about a chunk whose classification failed
#[derive(Debug, Clone)]
pub struct ChunkFailure {
    /// Position of the chunk in the document's chunk list
    pub index: usize,

    /// Start offset of the chunk in the combined text
    pub start: usize,

    /// End offset of the chunk in the combined text
    pub end: usize,

    /// Reason for failure
    pub reason: String,

    /// Leading text of the chunk, for debugging
    pub preview: String,
}
