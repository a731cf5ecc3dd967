//! Core Extractor implementation

use crate::aggregate::{aggregate, ChunkHits};
use crate::chunking::{ceil_char_boundary, floor_char_boundary, TextChunker};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::normalize::LabelNormalizer;
use crate::types::{ChunkFailure, DocumentExtraction, PageExtraction};
use clause_domain::traits::{ClassifyRequest, Classifier};
use clause_domain::{Chunk, CombinedText, Extraction, Page, Taxonomy, TaxonomyEntry};
use tracing::{debug, info, warn};

/// Bytes of chunk text kept in a failure record
const FAILURE_PREVIEW_LEN: usize = 1000;

/// The Extractor turns a document's pages into page-local, canonical
/// clause extractions.
///
/// One classification call is outstanding at a time. A failing chunk is
/// logged and recorded; it never aborts the document.
pub struct Extractor<C: Classifier> {
    classifier: C,
    taxonomy: Taxonomy,
    allowed_labels: Vec<TaxonomyEntry>,
    normalizer: LabelNormalizer,
    chunker: TextChunker,
    config: ExtractorConfig,
}

impl<C: Classifier> Extractor<C> {
    /// Create a new Extractor
    pub fn new(classifier: C, taxonomy: Taxonomy, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate()?;

        Ok(Self {
            classifier,
            allowed_labels: taxonomy.allowed_labels(),
            normalizer: LabelNormalizer::new(&taxonomy),
            chunker: TextChunker::from_config(&config),
            taxonomy,
            config,
        })
    }

    /// The taxonomy labels are normalized against
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// The underlying classifier
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract clauses from the given pages of one document.
    ///
    /// Every input page appears in the result. Blank pages are complete
    /// with no extractions.
    pub async fn extract_document(&self, document_id: &str, pages: &[Page]) -> DocumentExtraction {
        let mut result = DocumentExtraction {
            document_id: document_id.to_string(),
            ..Default::default()
        };
        for page in pages {
            result.pages.insert(
                page.number,
                PageExtraction {
                    page: page.number,
                    text: page.text.clone(),
                    extractions: Vec::new(),
                    complete: page.is_blank(),
                },
            );
        }

        let combined = CombinedText::from_pages(pages);
        if combined.is_blank() {
            debug!("Document '{}' has no text to classify", document_id);
            return result;
        }

        let chunks = self.chunker.chunk(combined.text());
        result.chunks_total = chunks.len();
        info!(
            "Document '{}': {} bytes across {} pages, split into {} chunks",
            document_id,
            combined.text().len(),
            combined.spans().len(),
            chunks.len()
        );

        let mut chunk_hits = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.into_iter().enumerate() {
            if idx > 0 && self.config.request_delay_ms > 0 {
                tokio::time::sleep(self.config.request_delay()).await;
            }

            debug!("Classifying chunk {}/{} [{}, {})", idx + 1, result.chunks_total, chunk.start, chunk.end);
            match self.classify_chunk(combined.text(), &chunk).await {
                Ok(hits) => chunk_hits.push(ChunkHits { chunk, hits }),
                Err(reason) => {
                    warn!(
                        "Chunk {}/{} of '{}' failed: {}",
                        idx + 1,
                        result.chunks_total,
                        document_id,
                        reason
                    );
                    let preview_end = floor_char_boundary(&chunk.text, FAILURE_PREVIEW_LEN);
                    result.chunk_failures.push(ChunkFailure {
                        index: idx,
                        start: chunk.start,
                        end: chunk.end,
                        reason,
                        preview: chunk.text[..preview_end].to_string(),
                    });
                }
            }
        }

        for span in combined.spans() {
            let covered = chunk_hits.iter().any(|ch| ch.chunk.overlaps(span.start, span.end));
            if let Some(page) = result.pages.get_mut(&span.page) {
                page.complete = covered;
            }
        }

        for (page, extractions) in aggregate(&combined, &chunk_hits) {
            if let Some(entry) = result.pages.get_mut(&page) {
                entry.extractions = extractions;
            }
        }

        info!(
            "Document '{}': {} extractions, {} failed chunks",
            document_id,
            result.total_extractions(),
            result.chunk_failures.len()
        );

        result
    }

    /// Classify one chunk and canonicalize the returned labels
    async fn classify_chunk(&self, text: &str, chunk: &Chunk) -> Result<Vec<Extraction>, String> {
        let (left_context, right_context) = context_window(text, chunk, self.config.context_chars);
        let request = ClassifyRequest {
            chunk_text: &chunk.text,
            left_context,
            right_context,
            allowed_labels: &self.allowed_labels,
        };

        let hits = self
            .classifier
            .classify(&request)
            .await
            .map_err(|e| e.to_string())?;

        debug!("Classifier returned {} hits", hits.len());

        Ok(hits
            .into_iter()
            .map(|hit| Extraction {
                label: self.normalizer.normalize(&hit.label),
                ..hit
            })
            .collect())
    }
}

/// Up to `context_chars` bytes on either side of the chunk
fn context_window<'a>(text: &'a str, chunk: &Chunk, context_chars: usize) -> (&'a str, &'a str) {
    let left_start = ceil_char_boundary(text, chunk.start.saturating_sub(context_chars));
    let right_end = floor_char_boundary(text, chunk.end.saturating_add(context_chars));
    (&text[left_start..chunk.start], &text[chunk.end..right_end])
}
