//! Result types returned by the conversion entry points.
//!
//! Everything here is `Serialize` so the CLI can dump it with `--json`.

use crate::footnote::{BoundarySource, FootnoteTable, InlinedPage, NumeralKind};
use serde::Serialize;
use std::path::PathBuf;

/// Document information read from the PDF's info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Per-page outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    /// 1-indexed page number in the source document.
    pub page_num: usize,
    /// Boundary y-coordinate (points from the top).
    pub boundary: f32,
    pub boundary_source: BoundarySource,
    pub body_lines: usize,
    pub footnote_lines: usize,
    pub markers: usize,
    pub substituted: usize,
    /// Final page text (sanitized if enabled).
    pub text: String,
}

impl From<InlinedPage> for PageResult {
    fn from(page: InlinedPage) -> Self {
        Self {
            page_num: page.index + 1,
            boundary: page.boundary.y,
            boundary_source: page.boundary.source,
            body_lines: page.body_lines,
            footnote_lines: page.footnote_lines,
            markers: page.markers,
            substituted: page.substituted,
            text: page.text,
        }
    }
}

/// Counters and timings for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionStats {
    pub total_pages: usize,
    pub processed_pages: usize,
    pub arabic_footnotes: usize,
    pub roman_footnotes: usize,
    pub markers: usize,
    pub substitutions: usize,
    pub orphans_attached: usize,
    pub orphans_dropped: usize,
    pub extract_duration_ms: u64,
    pub engine_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl ConversionStats {
    pub fn footnotes(&self, kind: NumeralKind) -> usize {
        match kind {
            NumeralKind::Arabic => self.arabic_footnotes,
            NumeralKind::Roman => self.roman_footnotes,
        }
    }

    /// Markers that found no footnote.
    pub fn unresolved(&self) -> usize {
        self.markers.saturating_sub(self.substitutions)
    }
}

/// Full result of converting one PDF.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// All pages joined with the configured separator.
    pub text: String,
    pub pages: Vec<PageResult>,
    pub footnotes: FootnoteTable,
    pub metadata: DocumentMetadata,
    pub stats: ConversionStats,
}

/// Outcome of one document in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub input: PathBuf,
    /// Written file, if conversion succeeded.
    pub output: Option<PathBuf>,
    pub stats: Option<ConversionStats>,
    pub error: Option<String>,
}

impl DocumentResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Sorted by input path.
    pub documents: Vec<DocumentResult>,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
}

impl BatchReport {
    pub fn from_results(mut documents: Vec<DocumentResult>, total_duration_ms: u64) -> Self {
        documents.sort_by(|a, b| a.input.cmp(&b.input));
        let succeeded = documents.iter().filter(|d| d.is_success()).count();
        Self {
            failed: documents.len() - succeeded,
            succeeded,
            documents,
            total_duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footnote::Boundary;

    #[test]
    fn test_page_result_is_one_indexed() {
        let page = InlinedPage {
            index: 4,
            boundary: Boundary {
                y: 612.5,
                source: BoundarySource::RuleLine,
            },
            body_lines: 30,
            footnote_lines: 3,
            markers: 2,
            substituted: 1,
            text: "body".into(),
        };
        let r = PageResult::from(page);
        assert_eq!(r.page_num, 5);
        assert_eq!(r.boundary_source, BoundarySource::RuleLine);
    }

    #[test]
    fn test_batch_report_counts_and_sorts() {
        let doc = |name: &str, error: Option<&str>| DocumentResult {
            input: PathBuf::from(name),
            output: None,
            stats: None,
            error: error.map(str::to_string),
        };
        let report = BatchReport::from_results(
            vec![doc("b.pdf", None), doc("a.pdf", Some("corrupt")), doc("c.pdf", None)],
            10,
        );
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.documents[0].input, PathBuf::from("a.pdf"));
    }

    #[test]
    fn test_stats_serialize() {
        let stats = ConversionStats {
            markers: 5,
            substitutions: 3,
            ..Default::default()
        };
        assert_eq!(stats.unresolved(), 2);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["substitutions"], 3);
    }
}
