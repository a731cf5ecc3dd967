//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use clause_resumer::{DocumentReport, DocumentStatus, RunMetrics};
use colored::{Color, Colorize};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format per-document progress.
    pub fn format_status(&self, reports: &[DocumentReport]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
            OutputFormat::Table => Ok(self.format_status_table(reports)),
            OutputFormat::Quiet => Ok(reports
                .iter()
                .map(|r| format!("{}\t{}", r.document_id, r.status))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_status_table(&self, reports: &[DocumentReport]) -> String {
        if reports.is_empty() {
            return self.colorize("No documents found.", Color::Yellow);
        }

        let mut builder = Builder::default();
        builder.push_record(["Document", "Status", "Processed", "Last Page", "Pending"]);

        for report in reports {
            let status = match report.status {
                DocumentStatus::Complete => self.colorize("complete", Color::Green),
                DocumentStatus::Partial => self.colorize("partial", Color::Yellow),
                DocumentStatus::Unseen => "unseen".to_string(),
            };
            builder.push_record([
                report.document_id.clone(),
                status,
                format!("{}/{}", report.processed_pages, report.total_pages),
                report
                    .last_processed_page
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                report.pending_pages.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let complete = reports
            .iter()
            .filter(|r| r.status == DocumentStatus::Complete)
            .count();
        format!("{}\n{} of {} documents complete", table, complete, reports.len())
    }

    /// Format the outcome of an extraction run.
    pub fn format_metrics(&self, metrics: &RunMetrics) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "documents_selected": metrics.documents_selected,
                "documents_processed": metrics.documents_processed,
                "pages_processed": metrics.pages_processed,
                "pages_blank": metrics.pages_blank,
                "pages_failed": metrics.pages_failed,
                "chunks_classified": metrics.chunks_classified,
                "chunks_failed": metrics.chunks_failed,
                "extractions_written": metrics.extractions_written,
                "pages_backfilled": metrics.pages_backfilled,
                "elapsed_secs": metrics.elapsed.as_secs_f64(),
                "seconds_per_page": metrics.seconds_per_page(),
            }))?),
            OutputFormat::Table => {
                if metrics.is_idle() {
                    Ok(self.success("All pages appear fully processed"))
                } else if metrics.pages_failed > 0 {
                    Ok(format!(
                        "{}\n{}",
                        metrics.summary(),
                        self.warning(&format!(
                            "{} page(s) left unrecorded; they will be retried on a later run",
                            metrics.pages_failed
                        ))
                    ))
                } else {
                    Ok(metrics.summary())
                }
            }
            OutputFormat::Quiet => Ok(metrics.pages_processed.to_string()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), Color::Green)
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), Color::Red)
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), Color::Blue)
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), Color::Yellow)
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if !self.color_enabled {
            return text.to_string();
        }
        text.color(color).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn reports() -> Vec<DocumentReport> {
        vec![
            DocumentReport {
                document_id: "document_1".to_string(),
                status: DocumentStatus::Complete,
                processed_pages: 4,
                total_pages: 4,
                last_processed_page: Some(4),
                pending_pages: 0,
            },
            DocumentReport {
                document_id: "document_2".to_string(),
                status: DocumentStatus::Unseen,
                processed_pages: 0,
                total_pages: 7,
                last_processed_page: None,
                pending_pages: 7,
            },
        ]
    }

    #[test]
    fn test_status_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_status(&reports()).unwrap();
        assert!(output.contains("Document"));
        assert!(output.contains("4/4"));
        assert!(output.contains("0/7"));
        assert!(output.contains("1 of 2 documents complete"));
    }

    #[test]
    fn test_status_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_status(&reports()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["status"], "complete");
        assert_eq!(value[1]["last_processed_page"], serde_json::Value::Null);
    }

    #[test]
    fn test_status_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_status(&reports()).unwrap();
        assert_eq!(output, "document_1\tcomplete\ndocument_2\tunseen");
    }

    #[test]
    fn test_empty_status() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_status(&[]).unwrap();
        assert!(output.contains("No documents found"));
    }

    #[test]
    fn test_metrics_formats() {
        let metrics = RunMetrics {
            documents_selected: 1,
            documents_processed: 1,
            pages_processed: 3,
            pages_failed: 1,
            elapsed: Duration::from_secs(6),
            ..Default::default()
        };

        let table = Formatter::new(OutputFormat::Table, false).format_metrics(&metrics).unwrap();
        assert!(table.contains("Extraction Run Summary"));
        assert!(table.contains("1 page(s) left unrecorded"));

        let json = Formatter::new(OutputFormat::Json, false).format_metrics(&metrics).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["pages_processed"], 3);
        assert_eq!(value["seconds_per_page"], 2.0);

        let quiet = Formatter::new(OutputFormat::Quiet, false).format_metrics(&metrics).unwrap();
        assert_eq!(quiet, "3");
    }

    #[test]
    fn test_idle_run() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_metrics(&RunMetrics::new()).unwrap();
        assert_eq!(output, "✓ All pages appear fully processed");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.error("bad"), "✗ bad");
    }
}
