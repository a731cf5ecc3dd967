//! Run loop tying the page store, extractor, outputs, and cache together

use crate::{Resumer, ResumerError, RunMetrics};
use crate::resumer::PlannedDocument;
use clause_domain::traits::{Classifier, PageStore};
use clause_domain::Page;
use clause_extractor::Extractor;
use clause_store::{CsvSink, DebugSink, JsonlSink};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Where a run writes its results
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    /// One row per extraction
    pub csv: PathBuf,
    /// One annotated page per line
    pub jsonl: PathBuf,
    /// Per-page and per-failure dumps; disabled when `None`
    pub debug_dir: Option<PathBuf>,
}

/// Open output files for one run
struct Sinks {
    csv: CsvSink,
    jsonl: JsonlSink,
    debug: Option<DebugSink>,
}

impl Sinks {
    fn open(paths: &OutputPaths) -> Result<Self, ResumerError> {
        Ok(Self {
            csv: CsvSink::open(&paths.csv)?,
            jsonl: JsonlSink::open(&paths.jsonl)?,
            debug: paths.debug_dir.as_ref().map(DebugSink::open).transpose()?,
        })
    }
}

/// Processes pending pages document by document
///
/// Output rows for a page are durable before the page is recorded in the
/// cache, so an interrupted run loses at most the page in flight.
///
/// # Examples
///
/// ```no_run
/// use clause_domain::Taxonomy;
/// use clause_extractor::{Extractor, ExtractorConfig};
/// use clause_llm::MockClassifier;
/// use clause_resumer::{ExtractionWorker, OutputPaths, Resumer, ResumerConfig};
/// use clause_store::{CacheFile, FsPageStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let extractor = Extractor::new(MockClassifier::empty(), Taxonomy::new(vec![]), ExtractorConfig::default())?;
///     let resumer = Resumer::new(CacheFile::load("outputs/cache.json"), ResumerConfig::default())?;
///     let outputs = OutputPaths {
///         csv: "outputs/features.csv".into(),
///         jsonl: "outputs/features.jsonl".into(),
///         debug_dir: None,
///     };
///     let mut worker = ExtractionWorker::new(extractor, FsPageStore::new("outputs/ocr"), resumer, outputs);
///
///     let metrics = worker.run().await?;
///     println!("{}", metrics.summary());
///     Ok(())
/// }
/// ```
pub struct ExtractionWorker<C: Classifier, S: PageStore> {
    extractor: Extractor<C>,
    store: S,
    resumer: Resumer,
    outputs: OutputPaths,
    metrics: RunMetrics,
}

impl<C: Classifier, S: PageStore> ExtractionWorker<C, S> {
    /// Create a new worker
    pub fn new(extractor: Extractor<C>, store: S, resumer: Resumer, outputs: OutputPaths) -> Self {
        Self {
            extractor,
            store,
            resumer,
            outputs,
            metrics: RunMetrics::new(),
        }
    }

    /// Metrics of the current or last run; valid after an interrupted run too
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// The resumer and its cache
    pub fn resumer(&self) -> &Resumer {
        &self.resumer
    }

    /// Process every planned document once.
    ///
    /// Chunk failures are absorbed; page store and output errors abort.
    pub async fn run(&mut self) -> Result<RunMetrics, ResumerError> {
        let started = Instant::now();
        self.metrics = RunMetrics::new();

        self.metrics.pages_backfilled = self.resumer.backfill_from_csv(&self.outputs.csv)?;
        let plan = self.resumer.plan(&self.store)?;
        self.metrics.documents_selected = plan.documents.len();

        if plan.documents.is_empty() {
            info!("All pages appear fully processed per the extraction cache");
            self.metrics.elapsed = started.elapsed();
            return Ok(self.metrics.clone());
        }

        let mut sinks = Sinks::open(&self.outputs)?;
        for (idx, document) in plan.documents.iter().enumerate() {
            info!(
                "Document {}/{}: '{}' ({}, {} pages pending)",
                idx + 1,
                plan.documents.len(),
                document.document_id,
                document.status,
                document.pending.len()
            );
            self.process_document(document, &mut sinks, started).await?;
            self.metrics.documents_processed += 1;
        }

        self.metrics.elapsed = started.elapsed();
        info!("Run finished.\n{}", self.metrics.summary());
        Ok(self.metrics.clone())
    }

    async fn process_document(
        &mut self,
        document: &PlannedDocument,
        sinks: &mut Sinks,
        started: Instant,
    ) -> Result<(), ResumerError> {
        let document_id = document.document_id.as_str();

        // Blank pages are recorded in page order with the classified ones,
        // never ahead of a lower page that is still unsettled.
        let mut pages = Vec::with_capacity(document.pending.len());
        let mut blank = VecDeque::new();
        for &page_number in &document.pending {
            let text = self
                .store
                .read_page(document_id, page_number)
                .map_err(|e| ResumerError::PageStore(e.to_string()))?
                .unwrap_or_default();

            if text.trim().is_empty() {
                blank.push_back(page_number);
            } else {
                pages.push(Page::new(document_id, page_number, text));
            }
        }

        let batch_size = self
            .resumer
            .config()
            .pages_per_batch
            .unwrap_or(pages.len())
            .max(1);

        let mut chunk_offset = 0;
        for batch in pages.chunks(batch_size) {
            if let Some(first) = batch.first() {
                self.record_blank_pages(document_id, &mut blank, Some(first.number))?;
            }

            let result = self.extractor.extract_document(document_id, batch).await;
            self.metrics.chunks_failed += result.chunk_failures.len();
            self.metrics.chunks_classified += result.chunks_total - result.chunk_failures.len();

            if let Some(debug) = &sinks.debug {
                for failure in &result.chunk_failures {
                    if let Err(e) =
                        debug.write_chunk_failure(document_id, chunk_offset + failure.index, &failure.reason, &failure.preview)
                    {
                        warn!("Could not write chunk failure dump: {}", e);
                    }
                }
            }
            chunk_offset += result.chunks_total;

            for (&page_number, page) in &result.pages {
                self.record_blank_pages(document_id, &mut blank, Some(page_number))?;
                if !page.complete {
                    warn!(
                        "{} page {}: every chunk covering it failed; leaving it unrecorded",
                        document_id, page_number
                    );
                    self.metrics.pages_failed += 1;
                    continue;
                }

                let written = sinks.csv.write_page(document_id, page_number, &page.extractions)?;
                sinks
                    .jsonl
                    .write_page(document_id, page_number, &page.text, &page.extractions)?;
                if let Some(debug) = &sinks.debug {
                    debug.write_page(document_id, page_number, &page.extractions)?;
                }
                self.resumer.record_page_done(document_id, page_number)?;

                self.metrics.pages_processed += 1;
                self.metrics.extractions_written += written;
                self.metrics.elapsed = started.elapsed();
            }
        }

        self.record_blank_pages(document_id, &mut blank, None)?;
        Ok(())
    }

    /// Record queued blank pages numbered below `before`, or all of them
    fn record_blank_pages(
        &mut self,
        document_id: &str,
        blank: &mut VecDeque<u32>,
        before: Option<u32>,
    ) -> Result<(), ResumerError> {
        while let Some(page_number) = blank.front().copied().filter(|p| before.is_none_or(|b| *p < b)) {
            self.resumer.record_page_done(document_id, page_number)?;
            self.metrics.pages_blank += 1;
            blank.pop_front();
        }
        Ok(())
    }
}
