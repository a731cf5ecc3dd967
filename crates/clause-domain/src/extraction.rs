//! Extraction module - one detected clause mention

/// A labeled text span produced by a classifier.
///
/// The coordinate space of `start`/`end` depends on the pipeline stage:
/// chunk-local when returned by a classifier, combined-text global during
/// aggregation, and page-local in the final output. Offsets are `None` when
/// the text could not be located; that is a valid end state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extraction {
    /// Clause label (free text from a classifier, canonical after normalization)
    pub label: String,
    /// Text supporting the label
    pub text: String,
    /// Start offset (inclusive), if known
    pub start: Option<usize>,
    /// End offset (exclusive), if known
    pub end: Option<usize>,
}

impl Extraction {
    /// Create an extraction without location information
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            start: None,
            end: None,
        }
    }

    /// Create an extraction with a known `[start, end)` span
    pub fn located(label: impl Into<String>, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            start: Some(start),
            end: Some(end),
        }
    }

    /// The span, if both offsets are present
    pub fn span(&self) -> Option<(usize, usize)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Return a copy with the given span
    pub fn with_span(&self, span: Option<(usize, usize)>) -> Self {
        Self {
            label: self.label.clone(),
            text: self.text.clone(),
            start: span.map(|(s, _)| s),
            end: span.map(|(_, e)| e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_requires_both_offsets() {
        let mut ext = Extraction::new("Wages Clause", "rates");
        assert_eq!(ext.span(), None);

        ext.start = Some(3);
        assert_eq!(ext.span(), None);

        ext.end = Some(8);
        assert_eq!(ext.span(), Some((3, 8)));
    }

    #[test]
    fn test_with_span() {
        let ext = Extraction::located("Wages Clause", "rates", 1, 6);
        let moved = ext.with_span(Some((10, 15)));
        assert_eq!(moved.span(), Some((10, 15)));
        assert_eq!(moved.label, ext.label);

        let cleared = ext.with_span(None);
        assert_eq!(cleared.start, None);
        assert_eq!(cleared.end, None);
    }
}
