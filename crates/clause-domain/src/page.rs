//! Page module - OCR'd pages and the combined document text

/// Separator placed between consecutive pages in a [`CombinedText`]
pub const PAGE_SEPARATOR: &str = "\n\n";

/// One page of a source document.
///
/// Page numbers are 1-indexed and may be sparse within a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Stable identifier of the owning document
    pub document_id: String,
    /// 1-indexed page number
    pub number: u32,
    /// Page text, used verbatim for offset arithmetic
    pub text: String,
}

impl Page {
    /// Create a new page
    pub fn new(document_id: impl Into<String>, number: u32, text: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            number,
            text: text.into(),
        }
    }

    /// Whether the page has no usable text
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Half-open `[start, end)` interval of one page inside a [`CombinedText`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    /// Page number
    pub page: u32,
    /// Start offset (inclusive) in the combined text
    pub start: usize,
    /// End offset (exclusive) in the combined text
    pub end: usize,
}

impl PageSpan {
    /// Create a new span
    pub fn new(page: u32, start: usize, end: usize) -> Self {
        Self { page, start, end }
    }

    /// Length of the page in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the page covers no text
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `[start, end)` shares at least one byte with this page
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && end > self.start
    }

    /// Clip a global interval to page-local coordinates.
    ///
    /// Callers should check [`PageSpan::overlaps`] first.
    pub fn clip(&self, start: usize, end: usize) -> (usize, usize) {
        let local_start = start.saturating_sub(self.start);
        let local_end = self.len().min(end.saturating_sub(self.start));
        (local_start, local_end)
    }
}

/// A document's pages concatenated in page-number order.
///
/// The span table is the single source of truth for mapping an offset in
/// the combined text back to a page. Blank pages contribute no text and get
/// no span.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CombinedText {
    text: String,
    spans: Vec<PageSpan>,
}

impl CombinedText {
    /// Concatenate `pages` (in page-number order) with [`PAGE_SEPARATOR`]
    pub fn from_pages(pages: &[Page]) -> Self {
        let mut ordered: Vec<&Page> = pages.iter().filter(|p| !p.is_blank()).collect();
        ordered.sort_by_key(|p| p.number);

        let mut text = String::new();
        let mut spans = Vec::with_capacity(ordered.len());

        for page in ordered {
            if !text.is_empty() {
                text.push_str(PAGE_SEPARATOR);
            }
            let start = text.len();
            text.push_str(&page.text);
            spans.push(PageSpan::new(page.number, start, text.len()));
        }

        Self { text, spans }
    }

    /// The combined text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The page span table, ordered by page number
    pub fn spans(&self) -> &[PageSpan] {
        &self.spans
    }

    /// Text of one page, as it appears inside the combined text
    pub fn page_text(&self, span: &PageSpan) -> &str {
        &self.text[span.start..span.end]
    }

    /// The first page with text, if any
    pub fn first_page(&self) -> Option<u32> {
        self.spans.first().map(|s| s.page)
    }

    /// Find the page containing the given offset
    pub fn page_at(&self, offset: usize) -> Option<u32> {
        self.spans
            .iter()
            .find(|s| s.start <= offset && offset < s.end)
            .map(|s| s.page)
    }

    /// Whether the combined text contains nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
