//! Clause Extractor
//!
//! Turns the OCR'd pages of a contract into page-local clause extractions
//! with canonical taxonomy labels.
//!
//! # Architecture
//!
//! ```text
//! Pages → CombinedText → TextChunker → Classifier → normalize → aggregate → per-page extractions
//! ```
//!
//! # Key Features
//!
//! - **Overlapping chunks**: Long documents are split on natural boundaries
//!   with a configurable overlap so no clause is lost at a cut
//! - **Label normalization**: Free-form classifier labels collapse onto the
//!   taxonomy, with `OTHER` as the fallback
//! - **Span recovery**: Missing or bogus offsets are recovered by locating the
//!   quoted text inside the chunk
//! - **Page remapping**: A clause spanning a page break is reported on every
//!   page it touches, clipped to that page
//! - **Failure isolation**: A failing chunk is logged and recorded, and the
//!   pages it alone covers are reported as incomplete
//!
//! # Example Usage
//!
//! ```no_run
//! use clause_domain::{Page, Taxonomy, TaxonomyEntry};
//! use clause_extractor::{Extractor, ExtractorConfig};
//! use clause_llm::MockClassifier;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let taxonomy = Taxonomy::new(vec![TaxonomyEntry::new("Wages Clause", "Pay rates")]);
//! let extractor = Extractor::new(MockClassifier::empty(), taxonomy, ExtractorConfig::default())?;
//!
//! let pages = vec![Page::new("document_1", 1, "Employees shall be paid weekly.")];
//! let result = extractor.extract_document("document_1", &pages).await;
//!
//! for (page, found) in &result.pages {
//!     println!("page {}: {} extractions", page, found.extractions.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod aggregate;
mod chunking;
mod config;
mod error;
mod extractor;
mod locate;
mod normalize;
mod types;


pub use aggregate::{aggregate, remap_to_pages, ChunkHits};
pub use chunking::TextChunker;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use locate::locate;
pub use normalize::LabelNormalizer;
pub use types::{ChunkFailure, DocumentExtraction, PageExtraction};
