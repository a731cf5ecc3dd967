//! Clause Resumer
//!
//! Resumable, crash-safe extraction runs over a corpus of OCR'd documents.
//!
//! # Overview
//!
//! The Resumer is responsible for:
//! - **Planning**: scanning the page store, refreshing page totals, and
//!   choosing which documents to process (optionally a seeded sample)
//! - **Resuming**: scheduling only the pages a previous run did not finish
//! - **Bookkeeping**: persisting the processing cache after every page
//!
//! # Document Lifecycle
//!
//! | Status | Meaning | Leaves when |
//! |--------|---------|-------------|
//! | **Unseen** | No page recorded | First page recorded |
//! | **Partial** | Some pages recorded | Every listed page recorded |
//! | **Complete** | Every listed page recorded | New pages appear in the store |
//!
//! # Usage
//!
//! ```no_run
//! use clause_resumer::{Resumer, ResumerConfig};
//! use clause_store::{CacheFile, FsPageStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FsPageStore::new("outputs/ocr");
//! let mut resumer = Resumer::new(CacheFile::load("outputs/cache.json"), ResumerConfig::default())?;
//!
//! let plan = resumer.plan(&store)?;
//! for document in &plan.documents {
//!     println!("{}: {:?}", document.document_id, document.pending);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
pub mod resumer;
mod worker;

pub use config::{ResumePolicy, ResumerConfig};
pub use error::ResumerError;
pub use metrics::RunMetrics;
pub use resumer::{DocumentReport, DocumentStatus, PlannedDocument, Resumer, RunPlan};
pub use worker::{ExtractionWorker, OutputPaths};
