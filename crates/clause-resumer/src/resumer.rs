//! Planning and bookkeeping for resumable runs
//!
//! Each document moves through `Unseen → Partial → Complete`. The
//! [`Resumer`] owns the processing cache; every completed page goes through
//! [`Resumer::record_page_done`], which persists the cache before returning.

use crate::{ResumePolicy, ResumerConfig, ResumerError};
use clause_domain::traits::PageStore;
use clause_store::{CacheFile, DocumentProgress};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Where a document stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// No page processed yet
    Unseen,
    /// Some but not all pages processed
    Partial,
    /// Every known page processed
    Complete,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentStatus::Unseen => "unseen",
            DocumentStatus::Partial => "partial",
            DocumentStatus::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Status of a document given its cache entry and listed pages
pub fn document_status(progress: Option<&DocumentProgress>, listed_pages: &[u32]) -> DocumentStatus {
    match progress {
        Some(p) if !p.processed_pages.is_empty() => {
            if listed_pages.iter().all(|page| p.is_processed(*page)) {
                DocumentStatus::Complete
            } else {
                DocumentStatus::Partial
            }
        }
        _ => DocumentStatus::Unseen,
    }
}

/// Pages to schedule for a document, ascending.
///
/// `AfterLastProcessed` resumes after the highest processed page, so with
/// pages `{1, 2, 5}` done nothing before page 6 is scheduled again.
pub fn pending_pages(progress: Option<&DocumentProgress>, listed_pages: &[u32], policy: ResumePolicy) -> Vec<u32> {
    let Some(progress) = progress else {
        return listed_pages.to_vec();
    };

    let start_page = match policy {
        ResumePolicy::AfterLastProcessed => progress.max_processed().map_or(1, |max| max.saturating_add(1)),
        ResumePolicy::FillGaps => 1,
    };

    listed_pages
        .iter()
        .copied()
        .filter(|page| *page >= start_page && !progress.is_processed(*page))
        .collect()
}

/// A document chosen for this run
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDocument {
    /// Document identifier
    pub document_id: String,
    /// Status at planning time
    pub status: DocumentStatus,
    /// Pages to process, ascending
    pub pending: Vec<u32>,
}

/// Outcome of planning a run
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    /// Documents to process, in order
    pub documents: Vec<PlannedDocument>,
    /// Documents found in the page store
    pub total_documents: usize,
    /// Documents with pending pages before sampling
    pub incomplete_documents: usize,
}

impl RunPlan {
    /// Total pages scheduled
    pub fn pending_page_count(&self) -> usize {
        self.documents.iter().map(|d| d.pending.len()).sum()
    }
}

/// Progress row for one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    /// Document identifier
    pub document_id: String,
    /// Current status
    pub status: DocumentStatus,
    /// Pages recorded as done
    pub processed_pages: usize,
    /// Pages known to exist
    pub total_pages: u32,
    /// Most recently recorded page
    pub last_processed_page: Option<u32>,
    /// Pages the next run would schedule
    pub pending_pages: usize,
}

/// Pick documents for this run.
///
/// Without a limit, or when everything fits, all candidates are kept in
/// order. Otherwise partially processed documents are sampled first, then
/// unseen ones fill the remaining slots. The sample is seeded.
pub fn select_documents(candidates: Vec<PlannedDocument>, sample_size: Option<usize>, seed: u64) -> Vec<PlannedDocument> {
    let limit = match sample_size {
        Some(n) if n < candidates.len() => n,
        _ => return candidates,
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let (partial, fresh): (Vec<_>, Vec<_>) = candidates
        .iter()
        .cloned()
        .partition(|d| d.status != DocumentStatus::Unseen);

    let mut selected = sample(&mut rng, partial, limit);
    let remaining = limit - selected.len();
    if remaining > 0 {
        selected.extend(sample(&mut rng, fresh, remaining));
    }

    if selected.is_empty() {
        selected = sample(&mut rng, candidates, limit);
    }
    selected
}

/// Seeded sample of up to `amount` items, without replacement
fn sample(rng: &mut StdRng, pool: Vec<PlannedDocument>, amount: usize) -> Vec<PlannedDocument> {
    let amount = amount.min(pool.len());
    let picks = rand::seq::index::sample(rng, pool.len(), amount).into_vec();
    let mut slots: Vec<Option<PlannedDocument>> = pool.into_iter().map(Some).collect();
    picks.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// Owner of the processing cache for a run
pub struct Resumer {
    cache: CacheFile,
    config: ResumerConfig,
    needs_recovery: bool,
}

impl Resumer {
    /// Create a new Resumer
    pub fn new(cache: CacheFile, config: ResumerConfig) -> Result<Self, ResumerError> {
        config.validate()?;
        Ok(Self {
            needs_recovery: cache.is_fresh(),
            cache,
            config,
        })
    }

    /// The cache being maintained
    pub fn cache(&self) -> &CacheFile {
        &self.cache
    }

    /// The active configuration
    pub fn config(&self) -> &ResumerConfig {
        &self.config
    }

    /// Pages of a document honoring `max_pages`
    pub fn listed_pages<S: PageStore>(&self, store: &S, document_id: &str) -> Result<Vec<u32>, ResumerError> {
        let mut pages = store
            .list_pages(document_id)
            .map_err(|e| ResumerError::PageStore(e.to_string()))?;
        if let Some(max) = self.config.max_pages {
            pages.retain(|page| *page <= max);
        }
        Ok(pages)
    }

    /// Recover progress from an existing output CSV.
    ///
    /// Runs at most once, and only when the cache file was missing or
    /// unreadable. A cache that loaded is authoritative, so a document reset
    /// stays reset even though its old rows remain in the CSV.
    pub fn backfill_from_csv(&mut self, csv_path: &Path) -> Result<usize, ResumerError> {
        if !std::mem::take(&mut self.needs_recovery) {
            debug!("Cache loaded from {}, skipping CSV backfill", self.cache.path().display());
            return Ok(0);
        }

        let added = self.cache.backfill_from_csv(csv_path)?;
        if added > 0 {
            self.cache.save()?;
        }
        Ok(added)
    }

    /// Scan the page store, refresh page totals, and choose documents.
    ///
    /// An unreadable page store aborts planning.
    pub fn plan<S: PageStore>(&mut self, store: &S) -> Result<RunPlan, ResumerError> {
        let documents = store
            .list_documents()
            .map_err(|e| ResumerError::PageStore(e.to_string()))?;

        let mut candidates = Vec::new();
        for document_id in &documents {
            let listed = self.listed_pages(store, document_id)?;
            let Some(highest) = listed.last().copied() else {
                debug!("Document '{}' has no pages", document_id);
                continue;
            };
            let count = u32::try_from(listed.len()).unwrap_or(u32::MAX);
            self.cache.observe_total_pages(document_id, count.max(highest));

            let progress = self.cache.document(document_id);
            let status = document_status(progress, &listed);
            let pending = pending_pages(progress, &listed, self.config.resume_policy);
            if !pending.is_empty() {
                candidates.push(PlannedDocument {
                    document_id: document_id.clone(),
                    status,
                    pending,
                });
            }
        }
        self.cache.save()?;

        let incomplete_documents = candidates.len();
        let selected = select_documents(candidates, self.config.sample_size, self.config.seed);

        let plan = RunPlan {
            documents: selected,
            total_documents: documents.len(),
            incomplete_documents,
        };
        info!(
            "Planned {} of {} incomplete documents ({} total), {} pages pending",
            plan.documents.len(),
            plan.incomplete_documents,
            plan.total_documents,
            plan.pending_page_count()
        );
        Ok(plan)
    }

    /// Per-document progress, without modifying the cache
    pub fn report<S: PageStore>(&self, store: &S) -> Result<Vec<DocumentReport>, ResumerError> {
        let documents = store
            .list_documents()
            .map_err(|e| ResumerError::PageStore(e.to_string()))?;

        let mut reports = Vec::with_capacity(documents.len());
        for document_id in documents {
            let listed = self.listed_pages(store, &document_id)?;
            let progress = self.cache.document(&document_id);
            let highest = listed.last().copied().unwrap_or(0);
            let count = u32::try_from(listed.len()).unwrap_or(u32::MAX);
            reports.push(DocumentReport {
                status: document_status(progress, &listed),
                processed_pages: progress.map_or(0, |p| p.processed_pages.len()),
                total_pages: progress.map_or(0, |p| p.total_pages).max(count.max(highest)),
                last_processed_page: progress.and_then(|p| p.last_processed_page),
                pending_pages: pending_pages(progress, &listed, self.config.resume_policy).len(),
                document_id,
            });
        }
        Ok(reports)
    }

    /// Record a page as done; the cache is on disk when this returns
    pub fn record_page_done(&mut self, document_id: &str, page: u32) -> Result<(), ResumerError> {
        self.cache.record_page_done(document_id, page)?;
        debug!("Recorded {} page {}", document_id, page);
        Ok(())
    }
}
