//! Extraction output files
//!
//! Each sink appends and makes its writes durable (`flush` + `sync_data`)
//! before returning, so a page can be recorded as done right after.

use crate::{ensure_parent, StoreError};
use clause_domain::Extraction;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Bytes of chunk text kept in a failure dump
const PREVIEW_LEN: usize = 1000;

/// One CSV row per extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRow {
    /// Document identifier
    pub document_id: String,
    /// Page number
    pub page_number: u32,
    /// Canonical taxonomy label
    pub canonical_label: String,
    /// Quoted text
    pub extraction_text: String,
    /// Page-local start offset, empty when unknown
    pub start_pos: Option<usize>,
    /// Page-local end offset, empty when unknown
    pub end_pos: Option<usize>,
}

impl ExtractionRow {
    /// Row for one page-local extraction
    pub fn new(document_id: &str, page_number: u32, extraction: &Extraction) -> Self {
        Self {
            document_id: document_id.to_string(),
            page_number,
            canonical_label: extraction.label.clone(),
            extraction_text: extraction.text.clone(),
            start_pos: extraction.start,
            end_pos: extraction.end,
        }
    }
}

fn open_append(path: &Path) -> Result<File, StoreError> {
    ensure_parent(path)?;
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Appends [`ExtractionRow`]s to a CSV file
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Open for appending; the header is written only into an empty file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let file = open_append(&path)?;
        let needs_header = file.metadata()?.len() == 0;
        let writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        Ok(Self { path, writer })
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one page's rows durably; returns the number written
    pub fn write_page(
        &mut self,
        document_id: &str,
        page_number: u32,
        extractions: &[Extraction],
    ) -> Result<usize, StoreError> {
        for extraction in extractions {
            self.writer
                .serialize(ExtractionRow::new(document_id, page_number, extraction))?;
        }
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(extractions.len())
    }
}

/// Span of an annotated extraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharInterval {
    /// Start offset
    pub start_pos: usize,
    /// End offset
    pub end_pos: usize,
}

/// Attributes of an annotated extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionAttributes {
    /// Canonical label
    pub feature_name: String,
}

/// One extraction inside an [`AnnotatedPage`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedExtraction {
    /// Always `"clause"`
    pub extraction_class: String,
    /// Quoted text
    pub extraction_text: String,
    /// Label carrier
    pub attributes: ExtractionAttributes,
    /// Page-local span, `null` when unknown
    pub char_interval: Option<CharInterval>,
    /// `"match_exact"` when the span is known
    pub alignment_status: Option<String>,
}

/// A page with its extractions, for highlighting tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPage {
    /// `<document>_page_<####>`
    pub document_id: String,
    /// Full page text the spans refer to
    pub text: String,
    /// Extractions on this page
    pub extractions: Vec<AnnotatedExtraction>,
}

impl AnnotatedPage {
    /// Build the annotated record for one page
    pub fn new(document_id: &str, page_number: u32, text: &str, extractions: &[Extraction]) -> Self {
        let extractions = extractions
            .iter()
            .map(|e| {
                let char_interval = e.span().map(|(start_pos, end_pos)| CharInterval { start_pos, end_pos });
                AnnotatedExtraction {
                    extraction_class: "clause".to_string(),
                    extraction_text: e.text.clone(),
                    attributes: ExtractionAttributes {
                        feature_name: e.label.clone(),
                    },
                    alignment_status: char_interval.map(|_| "match_exact".to_string()),
                    char_interval,
                }
            })
            .collect();

        Self {
            document_id: page_id(document_id, page_number),
            text: text.to_string(),
            extractions,
        }
    }
}

/// `<document>_page_<####>`
pub fn page_id(document_id: &str, page_number: u32) -> String {
    format!("{}_page_{:04}", document_id, page_number)
}

/// Appends one [`AnnotatedPage`] per line
pub struct JsonlSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlSink {
    /// Open for appending
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let writer = BufWriter::new(open_append(&path)?);
        Ok(Self { path, writer })
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one page durably
    pub fn write_page(
        &mut self,
        document_id: &str,
        page_number: u32,
        text: &str,
        extractions: &[Extraction],
    ) -> Result<(), StoreError> {
        let record = AnnotatedPage::new(document_id, page_number, text, extractions);
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }
}

/// Writes per-page and per-failure JSON dumps for inspection
pub struct DebugSink {
    dir: PathBuf,
}

impl DebugSink {
    /// Create the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Dump directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `<doc>_page_<####>.json`
    pub fn write_page(
        &self,
        document_id: &str,
        page_number: u32,
        extractions: &[Extraction],
    ) -> Result<PathBuf, StoreError> {
        let mut labels: Vec<&str> = Vec::new();
        for e in extractions {
            if !labels.contains(&e.label.as_str()) {
                labels.push(&e.label);
            }
        }
        let details: Vec<_> = extractions
            .iter()
            .map(|e| {
                json!({
                    "label": e.label,
                    "extraction_text": e.text,
                    "start_pos": e.start,
                    "end_pos": e.end,
                })
            })
            .collect();

        let path = self.dir.join(format!("{}.json", page_id(document_id, page_number)));
        write_json(
            &path,
            &json!({
                "document_id": document_id,
                "page_number": page_number,
                "labels": labels,
                "extractions": details,
            }),
        )?;
        Ok(path)
    }

    /// Write `<doc>_chunk_<###>.json` for a chunk whose classification failed
    pub fn write_chunk_failure(
        &self,
        document_id: &str,
        chunk_index: usize,
        error: &str,
        chunk_text: &str,
    ) -> Result<PathBuf, StoreError> {
        let mut preview_end = chunk_text.len().min(PREVIEW_LEN);
        while !chunk_text.is_char_boundary(preview_end) {
            preview_end -= 1;
        }

        let path = self.dir.join(format!("{}_chunk_{:03}.json", document_id, chunk_index));
        write_json(
            &path,
            &json!({
                "document_id": document_id,
                "chunk_index": chunk_index,
                "error": error,
                "text_preview": &chunk_text[..preview_end],
            }),
        )?;
        Ok(path)
    }
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<(), StoreError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    writer.get_ref().sync_data()?;
    Ok(())
}
