//! Pipeline stages around the footnote engine.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ footnote engine ──▶ postprocess ──▶ writer
//! (path)    (pdfium)    (crate::footnote)   (sanitize)     (txt/rtf/docx)
//! ```
//!
//! 1. [`input`]   — validate the PDF path, or list PDFs for batch mode
//! 2. [`extract`] — build layout pages; runs in `spawn_blocking` because
//!    pdfium is blocking
//! 3. [`postprocess`] — replace non-printable characters before writing

pub mod extract;
pub mod input;
pub mod postprocess;
