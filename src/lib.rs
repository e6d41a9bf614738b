//! # pdf-footnote-inline
//!
//! Extract the body text of PDF documents with every footnote moved inline,
//! right where it is referenced.
//!
//! ## Why this crate?
//!
//! Plain PDF-to-text conversion leaves footnotes at the bottom of each page,
//! detached from the sentence that cites them, and splits any footnote that
//! runs onto the next page in two. Downstream readers (screen readers,
//! translation, text mining) lose the link. This crate finds the footnote
//! region of each page, parses the footnotes (Arabic `1.` and Roman `iv.`
//! numbering), stitches cross-page continuations back together, and replaces
//! each superscript reference with `" [Footnote N: text]"`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate the path (%PDF magic)
//!  ├─ 2. Extract   characters → lines → styled spans via pdfium (spawn_blocking)
//!  ├─ 3. Boundary  rule line → numeral lines → small font → 60% default
//!  ├─ 4. Parse     per-page state machine over footnote-region lines
//!  ├─ 5. Resolve   attach cross-page continuations
//!  ├─ 6. Inline    substitute markers right to left
//!  ├─ 7. Sanitize  non-printable characters → space
//!  └─ 8. Output    text, RTF, or DOCX (one paragraph)
//! ```
//!
//! Steps 3–6 are pure and live in [`footnote`]; they work on any
//! [`layout::Page`], not only on pdfium output.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_footnote_inline::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("paper.pdf", &config).await?;
//!     println!("{}", output.text);
//!     eprintln!("{} of {} references inlined",
//!         output.stats.substitutions,
//!         output.stats.markers);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-inline` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf-footnote-inline = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! A pdfium shared library must be loadable at runtime. It is looked up via
//! `PDFIUM_LIB_PATH`, then the working directory, then the system library
//! path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod footnote;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;
pub mod writer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSelection, PageSeparator};
pub use convert::{convert, convert_from_bytes, convert_pages, convert_sync, convert_to_file, inspect};
pub use error::FootnoteError;
pub use footnote::{
    process_pages, BoundaryConfig, BoundarySource, EngineOptions, FlaggedNumeralDetector,
    FootnoteKey, FootnoteTable, InlinedDocument, NumeralKind, SuperscriptDetector,
};
pub use layout::pdfium::LayoutConfig;
pub use layout::{LayoutProvider, Line, Page, Segment, Span};
pub use output::{
    BatchReport, ConversionOutput, ConversionStats, DocumentMetadata, DocumentResult, PageResult,
};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_batch, convert_batch_stream, DocumentStream};
pub use writer::OutputFormat;
