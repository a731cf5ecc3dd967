//! Clause Storage Layer
//!
//! Everything that touches the filesystem: the OCR page store, the
//! processing cache, and the extraction output files.
//!
//! # Layout
//!
//! ```text
//! <ocr_dir>/document_<n>/page_<n>.txt    input pages (FsPageStore)
//! <cache_file>                            processing cache (CacheFile)
//! <output_csv>                            one row per extraction (CsvSink)
//! <output_jsonl>                          one annotated page per line (JsonlSink)
//! <debug_dir>/<doc>_page_<####>.json      per-page dumps (DebugSink)
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use clause_domain::traits::PageStore;
//! use clause_store::{CacheFile, FsPageStore};
//!
//! let store = FsPageStore::new("outputs/ocr");
//! let mut cache = CacheFile::load("outputs/cache.json");
//! for document_id in store.list_documents().unwrap() {
//!     let pages = store.list_pages(&document_id).unwrap();
//!     cache.observe_total_pages(&document_id, pages.len() as u32);
//! }
//! cache.save().unwrap();
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod pages;
pub mod sink;
pub mod taxonomy;

use std::path::Path;
use thiserror::Error;

pub use cache::{CacheFile, DocumentProgress, ProcessingCache};
pub use pages::FsPageStore;
pub use sink::{AnnotatedPage, CsvSink, DebugSink, ExtractionRow, JsonlSink};
pub use taxonomy::load_taxonomy;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Required input missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Delete a file or directory tree; `Ok(false)` if it did not exist
pub fn remove_path(path: impl AsRef<Path>) -> Result<bool, StoreError> {
    let path = path.as_ref();
    if path.is_dir() {
        std::fs::remove_dir_all(path)?;
        Ok(true)
    } else if path.exists() {
        std::fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Create the parent directory of `path` if it has one
pub(crate) fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
