//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction engine and
//! infrastructure. Implementations live in other crates.

use crate::{Extraction, TaxonomyEntry};
use std::future::Future;

/// Input for one classification call
#[derive(Debug, Clone, Copy)]
pub struct ClassifyRequest<'a> {
    /// The chunk to classify; extractions must come from this text
    pub chunk_text: &'a str,
    /// Text immediately before the chunk, for disambiguation only
    pub left_context: &'a str,
    /// Text immediately after the chunk, for disambiguation only
    pub right_context: &'a str,
    /// Labels the classifier must choose from (`OTHER` is implicit)
    pub allowed_labels: &'a [TaxonomyEntry],
}

/// Trait for clause classification backends
///
/// Implemented by the infrastructure layer (clause-llm). Returned
/// extractions carry free-text labels and chunk-local offsets, when the
/// backend knows them.
pub trait Classifier {
    /// Error type for classification calls
    type Error: std::fmt::Display;

    /// Classify one chunk of text
    fn classify(
        &self,
        request: &ClassifyRequest<'_>,
    ) -> impl Future<Output = Result<Vec<Extraction>, Self::Error>>;
}

/// Trait for reading OCR'd pages
///
/// Implemented by the infrastructure layer (clause-store)
pub trait PageStore {
    /// Error type for store operations
    type Error: std::fmt::Display;

    /// List document identifiers, sorted
    fn list_documents(&self) -> Result<Vec<String>, Self::Error>;

    /// List page numbers of a document, sorted ascending
    fn list_pages(&self, document_id: &str) -> Result<Vec<u32>, Self::Error>;

    /// Read one page; `None` when the page does not exist
    fn read_page(&self, document_id: &str, page: u32) -> Result<Option<String>, Self::Error>;
}
