//! Metrics collected during a run

use std::time::Duration;

/// Counters for one extraction run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunMetrics {
    /// Documents chosen by the planner
    pub documents_selected: usize,

    /// Documents whose pending pages were all attempted
    pub documents_processed: usize,

    /// Pages written to the outputs and recorded
    pub pages_processed: usize,

    /// Blank or missing pages recorded without classification
    pub pages_blank: usize,

    /// Pages left unrecorded because every chunk covering them failed
    pub pages_failed: usize,

    /// Chunks classified successfully
    pub chunks_classified: usize,

    /// Chunks whose classification failed
    pub chunks_failed: usize,

    /// Extraction rows written
    pub extractions_written: usize,

    /// Pages recovered from an existing output CSV
    pub pages_backfilled: usize,

    /// Wall-clock time spent
    pub elapsed: Duration,
}

impl RunMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Average seconds per processed page
    pub fn seconds_per_page(&self) -> Option<f64> {
        (self.pages_processed > 0).then(|| self.elapsed.as_secs_f64() / self.pages_processed as f64)
    }

    /// Whether anything was attempted
    pub fn is_idle(&self) -> bool {
        self.documents_selected == 0
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Extraction Run Summary".to_string(),
            "======================".to_string(),
            format!("Documents: {} selected, {} processed", self.documents_selected, self.documents_processed),
            format!(
                "Pages: {} processed, {} blank, {} failed",
                self.pages_processed, self.pages_blank, self.pages_failed
            ),
            format!("Chunks: {} classified, {} failed", self.chunks_classified, self.chunks_failed),
            format!("Extractions written: {}", self.extractions_written),
        ];

        if self.pages_backfilled > 0 {
            lines.push(format!("Pages backfilled from CSV: {}", self.pages_backfilled));
        }

        lines.push(format!("Elapsed: {:.1}s", self.elapsed.as_secs_f64()));
        match self.seconds_per_page() {
            Some(avg) => lines.push(format!("Average seconds per page: {:.2}", avg)),
            None => lines.push("No pages processed.".to_string()),
        }

        lines.join("\n")
    }
}
