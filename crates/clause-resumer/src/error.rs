//! Error types for resumable runs

use clause_extractor::ExtractorError;
use clause_store::StoreError;
use thiserror::Error;

/// Errors that abort a run
#[derive(Error, Debug)]
pub enum ResumerError {
    /// Page store could not be read
    #[error("Page store error: {0}")]
    PageStore(String),

    /// Cache or output file error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Extractor setup error
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
