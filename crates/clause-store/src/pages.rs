//! Filesystem page store
//!
//! Reads OCR output laid out as `<root>/document_<n>/page_<n>.txt`.

use crate::StoreError;
use clause_domain::traits::PageStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DOCUMENT_PREFIX: &str = "document_";
const PAGE_PREFIX: &str = "page_";
const PAGE_SUFFIX: &str = ".txt";

/// Page store over a directory of OCR'd documents
#[derive(Debug, Clone)]
pub struct FsPageStore {
    root: PathBuf,
}

impl FsPageStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_dir(&self, document_id: &str) -> PathBuf {
        self.root.join(document_id)
    }

    /// Path of an existing page file, trying the zero-padded name first
    fn page_path(&self, document_id: &str, page: u32) -> Result<Option<PathBuf>, StoreError> {
        let dir = self.document_dir(document_id);
        for name in [format!("page_{:04}.txt", page), format!("page_{}.txt", page)] {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }

        if !dir.is_dir() {
            return Ok(None);
        }
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if parse_page_number(&name.to_string_lossy()) == Some(page) && entry.path().is_file() {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }
}

impl PageStore for FsPageStore {
    type Error = StoreError;

    fn list_documents(&self) -> Result<Vec<String>, StoreError> {
        let mut documents = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_document_id(&name) && entry.path().is_dir() {
                documents.push(name);
            }
        }

        if documents.is_empty() {
            return Err(StoreError::NotFound(format!(
                "no document directories in {} (expected document_*)",
                self.root.display()
            )));
        }

        documents.sort();
        debug!("Found {} documents in {}", documents.len(), self.root.display());
        Ok(documents)
    }

    fn list_pages(&self, document_id: &str) -> Result<Vec<u32>, StoreError> {
        let mut pages = Vec::new();
        for entry in fs::read_dir(self.document_dir(document_id))? {
            let entry = entry?;
            if let Some(page) = parse_page_number(&entry.file_name().to_string_lossy()) {
                if entry.path().is_file() {
                    pages.push(page);
                }
            }
        }
        pages.sort_unstable();
        pages.dedup();
        Ok(pages)
    }

    fn read_page(&self, document_id: &str, page: u32) -> Result<Option<String>, StoreError> {
        let Some(path) = self.page_path(document_id, page)? else {
            return Ok(None);
        };
        let bytes = fs::read(&path)?;
        Ok(Some(String::from_utf8_lossy(&bytes).trim().to_string()))
    }
}

/// `document_<digits>`
fn is_document_id(name: &str) -> bool {
    name.strip_prefix(DOCUMENT_PREFIX)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Page number from `page_<digits>.txt`
pub fn parse_page_number(file_name: &str) -> Option<u32> {
    let digits = file_name.strip_prefix(PAGE_PREFIX)?.strip_suffix(PAGE_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
