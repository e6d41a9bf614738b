//! Progress-callback trait for document and page events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as documents are extracted and pages are finished. The CLI uses it
//! to drive an `indicatif` progress bar; a server could forward the same
//! events to a channel.
//!
//! # Example
//!
//! ```rust
//! use pdf_footnote_inline::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, substitutions: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{}: {} footnotes inlined", page_num, total_pages, substitutions);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { pages: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it works through documents.
///
/// Implementations must be `Send + Sync`: in batch mode several documents
/// are in flight at once and their events interleave. All methods have
/// default no-op implementations so callers only override what they need.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before a batch starts.
    ///
    /// # Arguments
    /// * `total_documents` — number of PDFs that will be attempted
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called once per document, after it is opened and before extraction.
    ///
    /// # Arguments
    /// * `path`        — input PDF
    /// * `total_pages` — number of pages that will be processed
    fn on_document_start(&self, path: &Path, total_pages: usize) {
        let _ = (path, total_pages);
    }

    /// Called when a page's text has been extracted from the PDF.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    fn on_page_extracted(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page's footnotes have been inlined.
    ///
    /// # Arguments
    /// * `page_num`      — 1-indexed page number
    /// * `total_pages`   — total pages
    /// * `substitutions` — references replaced on this page
    fn on_page_complete(&self, page_num: usize, total_pages: usize, substitutions: usize) {
        let _ = (page_num, total_pages, substitutions);
    }

    /// Called when a document finishes successfully.
    fn on_document_complete(&self, path: &Path, substitutions: usize) {
        let _ = (path, substitutions);
    }

    /// Called when a document fails.
    ///
    /// # Arguments
    /// * `path`  — input PDF
    /// * `error` — human-readable error description
    fn on_document_error(&self, path: &Path, error: &str) {
        let _ = (path, error);
    }

    /// Called once after every document in a batch has been attempted.
    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let _ = (total_documents, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
