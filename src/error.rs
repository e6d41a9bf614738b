//! Error types for the pdf-footnote-inline library.
//!
//! Only one error type exists because only one class of failure is fatal:
//! the layout provider could not give us a document (missing file, corrupt
//! PDF, wrong password, pdfium not loadable) or the result could not be
//! written. Everything the footnote engine itself runs into is recoverable
//! and never surfaces here:
//!
//! * a superscript span that is not a numeral is simply not a marker,
//! * a marker with no matching footnote is left as literal text,
//! * an orphan continuation with no entry to attach to is dropped and counted
//!   in [`crate::output::ConversionStats::orphans_dropped`].
//!
//! In batch mode a [`FootnoteError`] is fatal for one document only; it is
//! recorded in that document's [`crate::output::DocumentResult`] and the batch
//! moves on.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-footnote-inline library.
#[derive(Debug, Error)]
pub enum FootnoteError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// Batch mode was given something other than a directory.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// The layout provider could not read text or drawings from a page.
    #[error("Layout extraction failed for page {page}: {detail}")]
    LayoutExtractionFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the executable or in the working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output container (DOCX package) could not be assembled.
    #[error("Failed to encode {format} output: {detail}")]
    EncodeFailed { format: &'static str, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_failure_display() {
        let e = FootnoteError::LayoutExtractionFailed {
            page: 4,
            detail: "no text layer".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 4"), "got: {msg}");
        assert!(msg.contains("no text layer"));
    }

    #[test]
    fn page_out_of_range_display() {
        let e = FootnoteError::PageOutOfRange { page: 9, total: 3 };
        assert!(e.to_string().contains("3 pages"));
    }

    #[test]
    fn binding_failure_mentions_env_override() {
        let e = FootnoteError::PdfiumBindingFailed("dlopen failed".into());
        let msg = e.to_string();
        assert!(msg.contains("dlopen failed"));
        assert!(msg.contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn output_write_keeps_source() {
        use std::error::Error as _;
        let e = FootnoteError::OutputWriteFailed {
            path: PathBuf::from("/nope/out.docx"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing dir"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("out.docx"));
    }
}
