//! Durable record of which pages have been processed
//!
//! The cache is a human-readable JSON file:
//!
//! ```json
//! {
//!   "documents": {
//!     "document_0001": {
//!       "processed_pages": [1, 2, 5],
//!       "total_pages": 5,
//!       "last_processed_page": 5
//!     }
//!   }
//! }
//! ```
//!
//! It is rewritten in full after every completed page. A missing or
//! unreadable file loads as an empty cache.

use crate::{ensure_parent, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Progress of every known document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingCache {
    /// Progress keyed by document id
    #[serde(default)]
    pub documents: BTreeMap<String, DocumentProgress>,
}

/// Progress of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentProgress {
    /// Pages recorded as done
    pub processed_pages: BTreeSet<u32>,

    /// Pages known to exist; 0 while unknown
    pub total_pages: u32,

    /// Most recently recorded page
    pub last_processed_page: Option<u32>,
}

impl DocumentProgress {
    /// Highest processed page
    pub fn max_processed(&self) -> Option<u32> {
        self.processed_pages.last().copied()
    }

    /// Whether a page has been recorded
    pub fn is_processed(&self, page: u32) -> bool {
        self.processed_pages.contains(&page)
    }

    /// Record a page, returning whether it was new
    pub fn mark_processed(&mut self, page: u32) -> bool {
        self.last_processed_page = Some(page);
        self.processed_pages.insert(page)
    }
}

impl ProcessingCache {
    /// Progress of one document, if any
    pub fn document(&self, document_id: &str) -> Option<&DocumentProgress> {
        self.documents.get(document_id)
    }

    /// Progress of one document, created empty if absent
    pub fn document_mut(&mut self, document_id: &str) -> &mut DocumentProgress {
        self.documents.entry(document_id.to_string()).or_default()
    }

    /// Raise `total_pages` to at least `total`; it never shrinks
    pub fn observe_total_pages(&mut self, document_id: &str, total: u32) {
        let progress = self.document_mut(document_id);
        progress.total_pages = progress.total_pages.max(total);
    }

    /// Number of pages recorded across all documents
    pub fn processed_page_count(&self) -> usize {
        self.documents.values().map(|d| d.processed_pages.len()).sum()
    }
}

/// A [`ProcessingCache`] bound to its file
#[derive(Debug)]
pub struct CacheFile {
    path: PathBuf,
    cache: ProcessingCache,
    fresh: bool,
}

impl CacheFile {
    /// Load the cache, falling back to an empty one when the file is
    /// missing or unreadable
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let loaded = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!("Ignoring corrupt cache file {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache file at {}, starting fresh", path.display());
                None
            }
            Err(e) => {
                warn!("Cannot read cache file {}: {}", path.display(), e);
                None
            }
        };

        Self {
            path,
            fresh: loaded.is_none(),
            cache: loaded.unwrap_or_default(),
        }
    }

    /// Whether the cache started empty because its file was missing or
    /// unreadable. Only then can output files hold progress it lacks.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Cache file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents
    pub fn cache(&self) -> &ProcessingCache {
        &self.cache
    }

    /// Progress of one document, if any
    pub fn document(&self, document_id: &str) -> Option<&DocumentProgress> {
        self.cache.document(document_id)
    }

    /// Raise a document's `total_pages`; in memory only
    pub fn observe_total_pages(&mut self, document_id: &str, total: u32) {
        self.cache.observe_total_pages(document_id, total);
    }

    /// Record a page as done and persist immediately
    pub fn record_page_done(&mut self, document_id: &str, page: u32) -> Result<(), StoreError> {
        self.cache.document_mut(document_id).mark_processed(page);
        self.save()
    }

    /// Forget a document's progress and persist; returns whether it was known
    pub fn reset_document(&mut self, document_id: &str) -> Result<bool, StoreError> {
        let removed = self.cache.documents.remove(document_id).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Write the cache atomically: `<file>.tmp` then rename
    pub fn save(&self) -> Result<(), StoreError> {
        ensure_parent(&self.path)?;

        let tmp = tmp_path(&self.path);
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.cache)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            writer.get_ref().sync_data()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Mark pages found in an existing output CSV as processed.
    ///
    /// Recovers progress when the cache was lost but the output survived.
    /// Callers should only do this for a [fresh](Self::is_fresh) cache, or a
    /// document reset is undone by its old output rows.
    /// Rows without a usable document id and page number are skipped.
    /// Returns the number of newly marked pages; nothing is saved.
    pub fn backfill_from_csv(&mut self, csv_path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let csv_path = csv_path.as_ref();
        if !csv_path.exists() {
            return Ok(0);
        }

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(csv_path)?;
        let headers = reader.headers()?.clone();
        let column = |names: &[&str]| headers.iter().position(|h| names.contains(&h.trim()));
        let (Some(doc_col), Some(page_col)) = (
            column(&["document_id"]),
            column(&["page_number", "document_page"]),
        ) else {
            warn!("{} has no document_id/page_number columns, skipping backfill", csv_path.display());
            return Ok(0);
        };

        let mut added = 0;
        for record in reader.records() {
            let Ok(record) = record else {
                continue;
            };
            let document_id = record.get(doc_col).map(str::trim).unwrap_or_default();
            let Some(page) = record.get(page_col).and_then(|p| p.trim().parse::<u32>().ok()) else {
                continue;
            };
            if document_id.is_empty() {
                continue;
            }

            let progress = self.cache.document_mut(document_id);
            if progress.processed_pages.insert(page) {
                added += 1;
            }
            progress.last_processed_page = progress.max_processed();
        }

        if added > 0 {
            info!("Backfilled {} processed pages from {}", added, csv_path.display());
        }
        Ok(added)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheFile::load(dir.path().join("cache.json"));
        assert!(cache.cache().documents.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{\"documents\": {\"document_1\": ").unwrap();

        let cache = CacheFile::load(&path);
        assert!(cache.cache().documents.is_empty());
    }

    #[test]
    fn test_freshness() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = CacheFile::load(&path);
        assert!(cache.is_fresh());
        cache.record_page_done("document_1", 1).unwrap();

        assert!(!CacheFile::load(&path).is_fresh());

        fs::write(&path, "not json").unwrap();
        assert!(CacheFile::load(&path).is_fresh());
    }

    #[test]
    fn test_record_page_done_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/cache.json");

        let mut cache = CacheFile::load(&path);
        cache.record_page_done("document_1", 2).unwrap();
        cache.record_page_done("document_1", 1).unwrap();

        let reloaded = CacheFile::load(&path);
        let progress = reloaded.document("document_1").unwrap();
        assert_eq!(progress.processed_pages, BTreeSet::from([1, 2]));
        assert_eq!(progress.last_processed_page, Some(1));
        assert_eq!(progress.max_processed(), Some(2));
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_total_pages_never_shrinks() {
        let mut cache = ProcessingCache::default();
        cache.observe_total_pages("document_1", 10);
        cache.observe_total_pages("document_1", 7);
        assert_eq!(cache.document("document_1").unwrap().total_pages, 10);
        cache.observe_total_pages("document_1", 12);
        assert_eq!(cache.document("document_1").unwrap().total_pages, 12);
    }

    #[test]
    fn test_json_shape() {
        let mut cache = ProcessingCache::default();
        cache.document_mut("document_1").mark_processed(3);
        cache.observe_total_pages("document_1", 4);

        let json = serde_json::to_value(&cache).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "documents": {
                    "document_1": {"processed_pages": [3], "total_pages": 4, "last_processed_page": 3}
                }
            })
        );
    }

    #[test]
    fn test_loads_sparse_entries() {
        let cache: ProcessingCache =
            serde_json::from_str(r#"{"documents": {"document_9": {"processed_pages": [2, 1]}}}"#).unwrap();
        let progress = cache.document("document_9").unwrap();
        assert_eq!(progress.total_pages, 0);
        assert_eq!(progress.max_processed(), Some(2));
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(tmp_path(Path::new("out/cache.json")), PathBuf::from("out/cache.json.tmp"));
    }
}
