//! Integration tests for clause-store
//!
//! These tests exercise the page store, cache, and sinks against a real
//! temporary directory.

use clause_domain::traits::PageStore;
use clause_domain::Extraction;
use clause_store::{CacheFile, CsvSink, ExtractionRow, FsPageStore, JsonlSink, StoreError};
use std::fs;
use std::path::Path;

fn write_page(root: &Path, document: &str, file: &str, text: &str) {
    let dir = root.join(document);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), text).unwrap();
}

#[test]
fn test_page_store_listing() {
    let dir = tempfile::tempdir().unwrap();
    write_page(dir.path(), "document_2", "page_0001.txt", "two");
    write_page(dir.path(), "document_1", "page_0010.txt", "ten");
    write_page(dir.path(), "document_1", "page_2.txt", "two");
    write_page(dir.path(), "document_1", "notes.md", "ignored");
    write_page(dir.path(), "scratch", "page_1.txt", "ignored");
    fs::write(dir.path().join("document_3"), "a file, not a directory").unwrap();

    let store = FsPageStore::new(dir.path());

    assert_eq!(store.list_documents().unwrap(), vec!["document_1", "document_2"]);
    assert_eq!(store.list_pages("document_1").unwrap(), vec![2, 10]);
}

#[test]
fn test_read_page_strips_and_decodes() {
    let dir = tempfile::tempdir().unwrap();
    write_page(dir.path(), "document_1", "page_0001.txt", "\n  Article 1. Recognition \n\n");
    let doc_dir = dir.path().join("document_1");
    fs::write(doc_dir.join("page_0002.txt"), [b'o', b'k', 0xff, b'!']).unwrap();
    fs::write(doc_dir.join("page_3.txt"), "unpadded").unwrap();

    let store = FsPageStore::new(dir.path());

    assert_eq!(store.read_page("document_1", 1).unwrap().as_deref(), Some("Article 1. Recognition"));
    assert_eq!(store.read_page("document_1", 2).unwrap().as_deref(), Some("ok\u{fffd}!"));
    assert_eq!(store.read_page("document_1", 3).unwrap().as_deref(), Some("unpadded"));
    assert_eq!(store.read_page("document_1", 4).unwrap(), None);
    assert_eq!(store.read_page("document_9", 1).unwrap(), None);
}

#[test]
fn test_empty_ocr_dir_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsPageStore::new(dir.path());
    assert!(matches!(store.list_documents(), Err(StoreError::NotFound(_))));
}

#[test]
fn test_missing_ocr_dir_is_io_error() {
    let store = FsPageStore::new("/nonexistent/ocr/dir");
    assert!(matches!(store.list_documents(), Err(StoreError::Io(_))));
}

#[test]
fn test_csv_sink_appends_with_single_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/features.csv");

    {
        let mut sink = CsvSink::open(&path).unwrap();
        sink.write_page(
            "document_1",
            1,
            &[Extraction::located("Wages Clause", "paid, weekly", 3, 15)],
        )
        .unwrap();
    }
    {
        let mut sink = CsvSink::open(&path).unwrap();
        sink.write_page("document_1", 2, &[Extraction::new("OTHER", "somewhere")]).unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.matches("document_id,page_number").count(), 1);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<ExtractionRow> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].extraction_text, "paid, weekly");
    assert_eq!(rows[0].start_pos, Some(3));
    assert_eq!(rows[1].start_pos, None);
    assert_eq!(rows[1].end_pos, None);
}

#[test]
fn test_jsonl_sink_one_line_per_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotated.jsonl");

    let mut sink = JsonlSink::open(&path).unwrap();
    sink.write_page("document_1", 1, "Text one", &[]).unwrap();
    sink.write_page("document_1", 2, "Text two", &[Extraction::located("OTHER", "two", 5, 8)])
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["document_id"], "document_1_page_0002");
    assert_eq!(lines[1]["extractions"][0]["char_interval"]["end_pos"], 8);
}

#[test]
fn test_backfill_recovers_lost_cache() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("features.csv");
    {
        let mut sink = CsvSink::open(&csv_path).unwrap();
        sink.write_page("document_1", 1, &[Extraction::new("OTHER", "a")]).unwrap();
        sink.write_page("document_1", 3, &[Extraction::new("OTHER", "b"), Extraction::new("OTHER", "c")])
            .unwrap();
        sink.write_page("document_2", 7, &[Extraction::new("OTHER", "d")]).unwrap();
    }

    let mut cache = CacheFile::load(dir.path().join("cache.json"));
    assert_eq!(cache.backfill_from_csv(&csv_path).unwrap(), 3);
    assert_eq!(cache.backfill_from_csv(&csv_path).unwrap(), 0);

    let progress = cache.document("document_1").unwrap();
    assert_eq!(progress.processed_pages.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(progress.last_processed_page, Some(3));
    assert!(cache.document("document_2").unwrap().is_processed(7));
}

#[test]
fn test_backfill_legacy_columns_and_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("legacy.csv");
    fs::write(
        &csv_path,
        "document_id,document_page,feature_name\ndocument_4,2,Wages Clause\n,3,OTHER\ndocument_4,x,OTHER\ndocument_4,5\n",
    )
    .unwrap();

    let mut cache = CacheFile::load(dir.path().join("cache.json"));
    assert_eq!(cache.backfill_from_csv(&csv_path).unwrap(), 2);
    assert_eq!(
        cache.document("document_4").unwrap().processed_pages.iter().copied().collect::<Vec<_>>(),
        vec![2, 5]
    );
}

#[test]
fn test_backfill_missing_csv_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = CacheFile::load(dir.path().join("cache.json"));
    assert_eq!(cache.backfill_from_csv(dir.path().join("missing.csv")).unwrap(), 0);
}

#[test]
fn test_reset_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    let mut cache = CacheFile::load(&path);
    cache.record_page_done("document_1", 1).unwrap();
    cache.record_page_done("document_2", 1).unwrap();

    assert!(cache.reset_document("document_1").unwrap());
    assert!(!cache.reset_document("document_1").unwrap());

    let reloaded = CacheFile::load(&path);
    assert!(reloaded.document("document_1").is_none());
    assert!(reloaded.document("document_2").is_some());
}
