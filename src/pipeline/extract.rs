//! Page extraction: turn selected PDF pages into layout [`Page`]s via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking pool so
//! Tokio worker threads keep serving other documents in batch mode.
//!
//! A pdfium binding is created per call. Binding is cheap next to text
//! extraction and keeps each document independent of the others.

use crate::config::ConversionConfig;
use crate::error::FootnoteError;
use crate::layout::pdfium::{bind_pdfium, LayoutConfig, PdfiumDocument};
use crate::layout::{LayoutProvider, Page};
use crate::output::DocumentMetadata;
use crate::progress::ProgressCallback;
use std::path::Path;
use tracing::{debug, warn};

/// Pages pulled out of one PDF, plus what we learned about it on the way.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub pages: Vec<Page>,
    pub metadata: DocumentMetadata,
}

/// Extract the configured page selection of `pdf_path`.
///
/// Fires `on_document_start` and `on_page_extracted` on the callback, if any.
pub async fn extract_pages(
    pdf_path: &Path,
    config: &ConversionConfig,
) -> Result<ExtractedDocument, FootnoteError> {
    let path = pdf_path.to_path_buf();
    let password = config.password.clone();
    let layout = config.layout.clone();
    let selection = config.pages.clone();
    let callback = config.progress_callback.clone();

    tokio::task::spawn_blocking(move || {
        extract_pages_blocking(
            &path,
            password.as_deref(),
            layout,
            |total| selection.to_indices(total),
            callback,
        )
    })
    .await
    .map_err(|e| FootnoteError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking implementation of page extraction.
fn extract_pages_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    layout: LayoutConfig,
    select: impl FnOnce(usize) -> Vec<usize>,
    callback: Option<ProgressCallback>,
) -> Result<ExtractedDocument, FootnoteError> {
    let pdfium = bind_pdfium()?;
    let document = PdfiumDocument::open(&pdfium, pdf_path, password, layout)?;
    let metadata = document.metadata();
    let total_pages = document.page_count();

    let indices = select(total_pages);
    if indices.is_empty() {
        warn!(
            "No pages selected from {} ({} pages in document)",
            pdf_path.display(),
            total_pages
        );
    }
    if let Some(cb) = &callback {
        cb.on_document_start(pdf_path, indices.len());
    }

    let pages = pages_from_provider(&document, &indices, |page_num| {
        if let Some(cb) = &callback {
            cb.on_page_extracted(page_num, total_pages);
        }
    })?;

    Ok(ExtractedDocument { pages, metadata })
}

/// Pull `indices` (0-based) from any provider, skipping out-of-range ones.
///
/// `on_page` receives the 1-indexed page number after each page.
pub fn pages_from_provider<P: LayoutProvider + ?Sized>(
    provider: &P,
    indices: &[usize],
    mut on_page: impl FnMut(usize),
) -> Result<Vec<Page>, FootnoteError> {
    let total = provider.page_count();
    let mut pages = Vec::with_capacity(indices.len());

    for &idx in indices {
        if idx >= total {
            warn!("Skipping page {} (out of range, total={})", idx + 1, total);
            continue;
        }
        let page = provider.page(idx)?;
        debug!(
            "Extracted page {}: {} lines, {} segments",
            idx + 1,
            page.lines.len(),
            page.segments.len()
        );
        pages.push(page);
        on_page(idx + 1);
    }

    Ok(pages)
}

/// Read document metadata without extracting any page.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, FootnoteError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let document =
            PdfiumDocument::open(&pdfium, &path, pwd.as_deref(), LayoutConfig::default())?;
        Ok(document.metadata())
    })
    .await
    .map_err(|e| FootnoteError::Internal(format!("Metadata task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Line, Span};

    fn doc(n: usize) -> Vec<Page> {
        (0..n)
            .map(|i| {
                Page::new(i, 600.0, 800.0)
                    .with_line(Line::new(10.0, vec![Span::new(format!("page {}", i + 1), 10.0)]))
            })
            .collect()
    }

    #[test]
    fn test_selected_pages_in_order() {
        let mut seen = Vec::new();
        let pages = pages_from_provider(&doc(5), &[1, 3], |n| seen.push(n)).unwrap();
        assert_eq!(pages.iter().map(|p| p.index).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(seen, vec![2, 4]);
    }

    #[test]
    fn test_out_of_range_skipped() {
        let pages = pages_from_provider(&doc(2), &[0, 7], |_| {}).unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_provider_error_is_fatal() {
        struct Broken;
        impl LayoutProvider for Broken {
            fn page_count(&self) -> usize {
                3
            }
            fn page(&self, index: usize) -> Result<Page, FootnoteError> {
                Err(FootnoteError::LayoutExtractionFailed {
                    page: index + 1,
                    detail: "bad content stream".into(),
                })
            }
        }
        let err = pages_from_provider(&Broken, &[0, 1], |_| {}).unwrap_err();
        assert!(matches!(err, FootnoteError::LayoutExtractionFailed { page: 1, .. }));
    }
}
