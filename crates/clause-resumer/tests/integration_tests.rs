//! Integration tests for clause-resumer
//!
//! These tests run the full loop against a temporary OCR directory with a
//! scripted classifier.

use clause_domain::traits::{Classifier, ClassifyRequest};
use clause_domain::{Extraction, Taxonomy, TaxonomyEntry};
use clause_extractor::{Extractor, ExtractorConfig};
use clause_llm::MockClassifier;
use clause_resumer::{ExtractionWorker, OutputPaths, ResumePolicy, Resumer, ResumerConfig};
use clause_store::{CacheFile, ExtractionRow, FsPageStore};
use std::collections::BTreeSet;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn ocr_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("ocr")
    }

    fn cache_path(&self) -> std::path::PathBuf {
        self.dir.path().join("out/cache.json")
    }

    fn outputs(&self) -> OutputPaths {
        OutputPaths {
            csv: self.dir.path().join("out/features.csv"),
            jsonl: self.dir.path().join("out/features.jsonl"),
            debug_dir: Some(self.dir.path().join("out/debug")),
        }
    }

    /// Write `count` one-line pages: "Page N sets the wages clause."
    fn add_document(&self, document_id: &str, count: u32) {
        let dir = self.ocr_dir().join(document_id);
        fs::create_dir_all(&dir).unwrap();
        for n in 1..=count {
            fs::write(
                dir.join(format!("page_{:04}.txt", n)),
                format!("Page {} sets the wages clause.\n", n),
            )
            .unwrap();
        }
    }

    fn worker<C: Classifier>(
        &self,
        classifier: C,
        extractor_config: ExtractorConfig,
        resumer_config: ResumerConfig,
    ) -> ExtractionWorker<C, FsPageStore> {
        let extractor = Extractor::new(classifier, taxonomy(), extractor_config).unwrap();
        let resumer = Resumer::new(CacheFile::load(self.cache_path()), resumer_config).unwrap();
        ExtractionWorker::new(extractor, FsPageStore::new(self.ocr_dir()), resumer, self.outputs())
    }

    fn processed(&self, document_id: &str) -> Vec<u32> {
        CacheFile::load(self.cache_path())
            .document(document_id)
            .map(|p| p.processed_pages.iter().copied().collect())
            .unwrap_or_default()
    }

    fn csv_rows(&self) -> Vec<ExtractionRow> {
        read_rows(&self.outputs().csv)
    }
}

fn read_rows(path: &Path) -> Vec<ExtractionRow> {
    if !path.exists() {
        return Vec::new();
    }
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.deserialize().map(|r| r.unwrap()).collect()
}

/// A backend that never answers, standing in for a run killed mid-call
struct StalledClassifier;

impl Classifier for StalledClassifier {
    type Error = String;

    fn classify(&self, _request: &ClassifyRequest<'_>) -> impl Future<Output = Result<Vec<Extraction>, String>> {
        std::future::pending()
    }
}

fn taxonomy() -> Taxonomy {
    Taxonomy::new(vec![
        TaxonomyEntry::new("Wages Clause", "Pay rates"),
        TaxonomyEntry::new("Recognition Clause", "Union recognition"),
    ])
}

fn wages_classifier() -> MockClassifier {
    MockClassifier::new(vec![Extraction::new("wages clause", "wages clause")])
}

/// Each page is 29 bytes; a 31 byte window holds one page plus separator.
fn one_chunk_per_page() -> ExtractorConfig {
    ExtractorConfig {
        max_chunk_size: 31,
        overlap_fraction: 0.0,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_run_then_idle() {
    let fixture = Fixture::new();
    fixture.add_document("document_1", 3);
    fixture.add_document("document_2", 2);
    let classifier = wages_classifier();

    let mut worker = fixture.worker(classifier.clone(), one_chunk_per_page(), ResumerConfig::default());
    let metrics = worker.run().await.unwrap();

    assert_eq!(metrics.documents_selected, 2);
    assert_eq!(metrics.pages_processed, 5);
    assert_eq!(metrics.extractions_written, 5);
    assert_eq!(fixture.processed("document_1"), vec![1, 2, 3]);
    assert_eq!(fixture.processed("document_2"), vec![1, 2]);

    let rows = fixture.csv_rows();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r.canonical_label == "Wages Clause"));
    assert_eq!(rows[0].start_pos, Some(16));
    assert_eq!(rows[0].end_pos, Some(28));

    let jsonl = fs::read_to_string(&fixture.outputs().jsonl).unwrap();
    assert_eq!(jsonl.lines().count(), 5);
    assert!(fixture.outputs().debug_dir.unwrap().join("document_1_page_0003.json").exists());

    // Second run finds nothing to do
    let calls = classifier.call_count();
    let mut worker = fixture.worker(classifier.clone(), one_chunk_per_page(), ResumerConfig::default());
    let metrics = worker.run().await.unwrap();
    assert!(metrics.is_idle());
    assert_eq!(classifier.call_count(), calls);
    assert_eq!(fixture.csv_rows().len(), 5);
}

#[tokio::test]
async fn test_one_failing_chunk_of_five() {
    let fixture = Fixture::new();
    fixture.add_document("document_1", 5);
    let mut classifier = wages_classifier();
    classifier.add_error("Page 3 ");

    let mut worker = fixture.worker(classifier.clone(), one_chunk_per_page(), ResumerConfig::default());
    let metrics = worker.run().await.unwrap();

    assert_eq!(classifier.call_count(), 5);
    assert_eq!(metrics.chunks_classified, 4);
    assert_eq!(metrics.chunks_failed, 1);
    assert_eq!(metrics.pages_processed, 4);
    assert_eq!(metrics.pages_failed, 1);
    assert_eq!(fixture.processed("document_1"), vec![1, 2, 4, 5]);

    let pages: BTreeSet<u32> = fixture.csv_rows().iter().map(|r| r.page_number).collect();
    assert_eq!(pages, BTreeSet::from([1, 2, 4, 5]));
    assert!(fixture
        .outputs()
        .debug_dir
        .unwrap()
        .join("document_1_chunk_002.json")
        .exists());
}

#[tokio::test]
async fn test_gap_needs_fill_gaps_policy() {
    let fixture = Fixture::new();
    fixture.add_document("document_1", 5);
    let mut failing = wages_classifier();
    failing.add_error("Page 3 ");
    fixture
        .worker(failing, one_chunk_per_page(), ResumerConfig::default())
        .run()
        .await
        .unwrap();

    // Default policy: page 3 sits before the last processed page
    let healthy = wages_classifier();
    let metrics = fixture
        .worker(healthy.clone(), one_chunk_per_page(), ResumerConfig::default())
        .run()
        .await
        .unwrap();
    assert!(metrics.is_idle());
    assert_eq!(healthy.call_count(), 0);

    let config = ResumerConfig {
        resume_policy: ResumePolicy::FillGaps,
        ..Default::default()
    };
    let metrics = fixture
        .worker(healthy.clone(), one_chunk_per_page(), config)
        .run()
        .await
        .unwrap();
    assert_eq!(metrics.pages_processed, 1);
    assert_eq!(healthy.call_count(), 1);
    assert_eq!(fixture.processed("document_1"), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_resume_after_interruption() {
    let fixture = Fixture::new();
    fixture.add_document("document_1", 4);

    // A previous run was killed after recording pages 1 and 2
    let mut cache = CacheFile::load(fixture.cache_path());
    cache.record_page_done("document_1", 1).unwrap();
    cache.record_page_done("document_1", 2).unwrap();

    let classifier = wages_classifier();
    let config = ResumerConfig {
        pages_per_batch: Some(1),
        ..Default::default()
    };
    let metrics = fixture
        .worker(classifier.clone(), ExtractorConfig::default(), config)
        .run()
        .await
        .unwrap();

    assert_eq!(metrics.pages_processed, 2);
    assert_eq!(classifier.call_count(), 2);
    let chunks: Vec<String> = classifier.requests().into_iter().map(|r| r.chunk_text).collect();
    assert_eq!(chunks, vec!["Page 3 sets the wages clause.", "Page 4 sets the wages clause."]);
    assert_eq!(fixture.processed("document_1"), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_blank_pages_recorded_without_classification() {
    let fixture = Fixture::new();
    fixture.add_document("document_1", 2);
    fs::write(fixture.ocr_dir().join("document_1/page_0003.txt"), "  \n\n ").unwrap();

    let classifier = wages_classifier();
    let metrics = fixture
        .worker(classifier.clone(), ExtractorConfig::default(), ResumerConfig::default())
        .run()
        .await
        .unwrap();

    assert_eq!(metrics.pages_blank, 1);
    assert_eq!(metrics.pages_processed, 2);
    assert_eq!(classifier.call_count(), 1);
    assert_eq!(fixture.processed("document_1"), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_lost_cache_is_backfilled_from_csv() {
    let fixture = Fixture::new();
    fixture.add_document("document_1", 3);
    let classifier = wages_classifier();
    fixture
        .worker(classifier.clone(), one_chunk_per_page(), ResumerConfig::default())
        .run()
        .await
        .unwrap();

    fs::remove_file(fixture.cache_path()).unwrap();
    classifier.reset_call_count();

    let metrics = fixture
        .worker(classifier.clone(), one_chunk_per_page(), ResumerConfig::default())
        .run()
        .await
        .unwrap();

    assert_eq!(metrics.pages_backfilled, 3);
    assert!(metrics.is_idle());
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn test_sampling_limits_documents() {
    let fixture = Fixture::new();
    for n in 1..=4 {
        fixture.add_document(&format!("document_{}", n), 1);
    }
    let config = ResumerConfig {
        sample_size: Some(2),
        seed: 7,
        ..Default::default()
    };

    let metrics = fixture
        .worker(wages_classifier(), ExtractorConfig::default(), config)
        .run()
        .await
        .unwrap();

    assert_eq!(metrics.documents_selected, 2);
    assert_eq!(metrics.pages_processed, 2);
}

#[tokio::test]
async fn test_empty_ocr_dir_aborts() {
    let fixture = Fixture::new();
    fs::create_dir_all(fixture.ocr_dir()).unwrap();

    let result = fixture
        .worker(wages_classifier(), ExtractorConfig::default(), ResumerConfig::default())
        .run()
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_reset_document_readmits_gap_page() {
    let fixture = Fixture::new();
    fixture.add_document("document_1", 5);
    let mut failing = wages_classifier();
    failing.add_error("Page 3 ");
    fixture
        .worker(failing, one_chunk_per_page(), ResumerConfig::default())
        .run()
        .await
        .unwrap();
    assert_eq!(fixture.processed("document_1"), vec![1, 2, 4, 5]);

    let mut cache = CacheFile::load(fixture.cache_path());
    assert!(cache.reset_document("document_1").unwrap());

    // The old CSV rows must not bring the reset pages back
    let healthy = wages_classifier();
    let metrics = fixture
        .worker(healthy.clone(), one_chunk_per_page(), ResumerConfig::default())
        .run()
        .await
        .unwrap();

    assert_eq!(metrics.pages_backfilled, 0);
    assert_eq!(healthy.call_count(), 5);
    assert!(healthy
        .requests()
        .iter()
        .any(|r| r.chunk_text.starts_with("Page 3 ")));
    assert_eq!(fixture.processed("document_1"), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_interrupted_run_never_records_blank_page_ahead_of_text() {
    let fixture = Fixture::new();
    fixture.add_document("document_1", 4);
    let doc = fixture.ocr_dir().join("document_1");
    fs::write(doc.join("page_0001.txt"), "\n").unwrap();
    fs::write(doc.join("page_0004.txt"), "   ").unwrap();

    let mut stalled = fixture.worker(StalledClassifier, ExtractorConfig::default(), ResumerConfig::default());
    let interrupted = tokio::time::timeout(Duration::from_millis(200), stalled.run()).await;
    assert!(interrupted.is_err());

    // Page 1 precedes every text page; page 4 must wait for pages 2 and 3
    assert_eq!(fixture.processed("document_1"), vec![1]);

    let healthy = wages_classifier();
    let metrics = fixture
        .worker(healthy.clone(), ExtractorConfig::default(), ResumerConfig::default())
        .run()
        .await
        .unwrap();

    assert_eq!(healthy.call_count(), 1);
    assert_eq!(metrics.pages_processed, 2);
    assert_eq!(metrics.pages_blank, 1);
    assert_eq!(fixture.processed("document_1"), vec![1, 2, 3, 4]);
}
