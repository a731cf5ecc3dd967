//! Clause Extraction Domain Layer
//!
//! Core data model and trait seams for the clause extraction pipeline.
//! This crate has no external dependencies: everything that touches the
//! network, the filesystem or a serialization format lives in another crate
//! and plugs in through the traits defined in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Page**: one OCR'd page of a source document, addressed by page number
//! - **CombinedText**: a document's pages joined in order, plus the
//!   [`PageSpan`] table mapping offsets back to pages
//! - **Chunk**: a bounded window of the combined text sent to a classifier
//! - **Extraction**: a labeled text span, with offsets when they are known
//! - **Taxonomy**: the canonical clause labels, always including `OTHER`
//!
//! ## Offsets
//!
//! All offsets are UTF-8 byte offsets into the text the extraction refers to
//! (chunk text, combined text or page text, depending on the stage). Offsets
//! always fall on `char` boundaries.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod extraction;
pub mod page;
pub mod taxonomy;
pub mod traits;

// Re-exports for convenience
pub use chunk::Chunk;
pub use extraction::Extraction;
pub use page::{CombinedText, Page, PageSpan, PAGE_SEPARATOR};
pub use taxonomy::{Taxonomy, TaxonomyEntry, OTHER_LABEL};
