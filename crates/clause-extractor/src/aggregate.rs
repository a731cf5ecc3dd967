//! Merge per-chunk classifier output into page-local extractions
//!
//! Offsets move through three coordinate spaces: chunk-local (as returned
//! by the classifier), combined-text global (where overlap-induced repeats
//! are removed), and finally page-local (clipped to each page touched).

use crate::locate::locate;
use clause_domain::{Chunk, CombinedText, Extraction, PageSpan};
use std::collections::{BTreeMap, HashSet};

/// Classifier output for one chunk; hit offsets are chunk-local
#[derive(Debug, Clone)]
pub struct ChunkHits {
    /// The chunk that was classified
    pub chunk: Chunk,
    /// Extractions returned for it, labels already canonical
    pub hits: Vec<Extraction>,
}

/// Identity used to collapse repeated extractions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    Span(String, usize, usize),
    Text(String, String),
}

fn dedup_key(extraction: &Extraction) -> DedupKey {
    match extraction.span() {
        Some((start, end)) => DedupKey::Span(extraction.label.clone(), start, end),
        None => DedupKey::Text(extraction.label.clone(), normalize_text(&extraction.text)),
    }
}

/// Whitespace-collapsed, lowercased text used for offset-less matching
fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Keep the first extraction for each key, preserving order
fn dedup(extractions: Vec<Extraction>) -> Vec<Extraction> {
    let mut seen = HashSet::new();
    extractions
        .into_iter()
        .filter(|e| seen.insert(dedup_key(e)))
        .collect()
}

/// Classifier-provided offsets, kept only when they select the hit's own
/// text (ASCII case-insensitive) within the chunk
fn valid_local_span(chunk: &Chunk, hit: &Extraction) -> Option<(usize, usize)> {
    let (start, end) = hit.span()?;
    let selected = chunk.text.get(start..end).filter(|_| start < end)?;
    selected
        .trim()
        .eq_ignore_ascii_case(hit.text.trim())
        .then_some((start, end))
}

/// Rewrite one hit into combined-text coordinates
fn to_global(chunk: &Chunk, hit: &Extraction) -> Extraction {
    let local = valid_local_span(chunk, hit).or_else(|| locate(&chunk.text, &hit.text));
    hit.with_span(local.map(|(s, e)| (chunk.start + s, chunk.start + e)))
}

/// Aggregate chunk results into deduplicated, page-local extractions.
///
/// Every page with text gets an entry, possibly empty. The result is a
/// pure function of its inputs.
pub fn aggregate(combined: &CombinedText, chunk_hits: &[ChunkHits]) -> BTreeMap<u32, Vec<Extraction>> {
    let global: Vec<Extraction> = chunk_hits
        .iter()
        .flat_map(|ch| ch.hits.iter().map(move |hit| to_global(&ch.chunk, hit)))
        .collect();

    remap_to_pages(combined.text(), combined.spans(), dedup(global))
}

/// Attribute global extractions to pages.
///
/// A located extraction is copied to every page its interval overlaps,
/// clipped to that page. An unlocated one is searched for in each page's
/// text, first hit wins. Anything still unplaced goes to the first page
/// without offsets so nothing is dropped.
pub fn remap_to_pages(
    combined_text: &str,
    spans: &[PageSpan],
    extractions: Vec<Extraction>,
) -> BTreeMap<u32, Vec<Extraction>> {
    let mut pages: BTreeMap<u32, Vec<Extraction>> =
        spans.iter().map(|s| (s.page, Vec::new())).collect();

    let Some(first_page) = spans.first().map(|s| s.page) else {
        return pages;
    };

    for extraction in extractions {
        let mut placed = false;

        match extraction.span() {
            Some((start, end)) => {
                for span in spans.iter().filter(|s| s.overlaps(start, end)) {
                    let local = span.clip(start, end);
                    pages.entry(span.page).or_default().push(extraction.with_span(Some(local)));
                    placed = true;
                }
            }
            None => {
                for span in spans {
                    let page_text = &combined_text[span.start..span.end];
                    if let Some(local) = locate(page_text, &extraction.text) {
                        pages.entry(span.page).or_default().push(extraction.with_span(Some(local)));
                        placed = true;
                        break;
                    }
                }
            }
        }

        if !placed {
            pages.entry(first_page).or_default().push(extraction.with_span(None));
        }
    }

    for extractions in pages.values_mut() {
        let mut deduped = dedup(std::mem::take(extractions));
        deduped.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        *extractions = deduped;
    }

    pages
}

/// Located first, then by position, then by label
fn sort_key(extraction: &Extraction) -> (bool, usize, usize, &str) {
    (
        extraction.span().is_none(),
        extraction.start.unwrap_or(0),
        extraction.end.unwrap_or(0),
        extraction.label.as_str(),
    )
}
