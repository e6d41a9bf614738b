//! Single-document conversion entry points.
//!
//! [`convert`] is the async front door: validate the path, extract pages on
//! the blocking pool, run the footnote engine, sanitize, assemble. The
//! engine half is available on its own as [`convert_pages`] for callers that
//! bring their own [`Page`]s (a different PDF backend, cached layouts, tests).

use crate::config::ConversionConfig;
use crate::error::FootnoteError;
use crate::footnote::{process_pages, NumeralKind};
use crate::layout::Page;
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata, PageResult};
use crate::pipeline::{extract, input, postprocess};
use crate::writer::OutputFormat;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a PDF file, inlining every resolvable footnote reference.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(FootnoteError)` only for fatal errors:
/// - File not found / permission denied / not a PDF
/// - pdfium could not be loaded, or the PDF could not be opened
/// - Text extraction failed on a selected page
///
/// Unresolved references and orphan footnote text are not errors; they are
/// counted in [`ConversionStats`].
pub async fn convert(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, FootnoteError> {
    let path = input_path.as_ref();
    match convert_inner(path, config).await {
        Ok(output) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_complete(path, output.stats.substitutions);
            }
            Ok(output)
        }
        Err(e) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_error(path, &e.to_string());
            }
            Err(e)
        }
    }
}

async fn convert_inner(
    path: &Path,
    config: &ConversionConfig,
) -> Result<ConversionOutput, FootnoteError> {
    let total_start = Instant::now();
    info!("Starting conversion: {}", path.display());

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let pdf_path = input::resolve_local(path)?;

    // ── Step 2: Extract layout pages ─────────────────────────────────────
    let extract_start = Instant::now();
    let extracted = extract::extract_pages(&pdf_path, config).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Extracted {} of {} pages in {}ms",
        extracted.pages.len(),
        extracted.metadata.page_count,
        extract_duration_ms
    );

    // ── Step 3: Footnote engine, sanitize, assemble ──────────────────────
    let mut output = convert_pages(&extracted.pages, extracted.metadata, config);
    output.stats.extract_duration_ms = extract_duration_ms;
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: {} pages, {} footnotes, {}/{} references inlined, {}ms total",
        output.stats.processed_pages,
        output.footnotes.len(),
        output.stats.substitutions,
        output.stats.markers,
        output.stats.total_duration_ms
    );
    if output.stats.orphans_dropped > 0 {
        warn!(
            "{} footnote lines could not be attached to any footnote",
            output.stats.orphans_dropped
        );
    }

    Ok(output)
}

/// Run the footnote engine over already-extracted pages and assemble the
/// result. Synchronous and I/O free.
///
/// Fires `on_page_complete` for each page on the configured callback.
pub fn convert_pages(
    pages: &[Page],
    metadata: DocumentMetadata,
    config: &ConversionConfig,
) -> ConversionOutput {
    let engine_start = Instant::now();
    let document = process_pages(pages, &config.engine_options());
    let engine_duration_ms = engine_start.elapsed().as_millis() as u64;

    let total = document.pages.len();
    let markers = document.markers();
    let substitutions = document.substituted();

    let page_results: Vec<PageResult> = document
        .pages
        .into_iter()
        .map(|page| {
            let mut result = PageResult::from(page);
            if config.sanitize {
                result.text = postprocess::sanitize(&result.text);
            }
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_complete(result.page_num, total, result.substituted);
            }
            result
        })
        .collect();

    let text = assemble_document(&page_results, config);
    debug!("Assembled {} bytes from {} pages", text.len(), total);

    let stats = ConversionStats {
        total_pages: metadata.page_count.max(total),
        processed_pages: total,
        arabic_footnotes: document.footnotes.count(NumeralKind::Arabic),
        roman_footnotes: document.footnotes.count(NumeralKind::Roman),
        markers,
        substitutions,
        orphans_attached: document.resolution.attached,
        orphans_dropped: document.resolution.dropped,
        extract_duration_ms: 0,
        engine_duration_ms,
        total_duration_ms: engine_duration_ms,
    };

    ConversionOutput {
        text,
        pages: page_results,
        footnotes: document.footnotes,
        metadata,
        stats,
    }
}

/// Convert a PDF and write the result to `output_path`.
///
/// The format is `config.output_format`, else inferred from the output
/// extension, else RTF. Uses atomic write (temp file + rename) to
/// prevent partial files.
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, FootnoteError> {
    let output = convert(input_path, config).await?;
    let path = output_path.as_ref();
    let format = resolve_format(config, path);

    let bytes = format.render(&output.text)?;
    write_atomic(path, &bytes).await?;
    info!("Wrote {} ({}, {} bytes)", path.display(), format, bytes.len());

    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, FootnoteError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FootnoteError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_path, config))
}

/// Read PDF metadata without extracting any page text.
pub async fn inspect(
    input_path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, FootnoteError> {
    let pdf_path = input::resolve_local(input_path.as_ref())?;
    extract::extract_metadata(&pdf_path, password).await
}

/// Convert PDF bytes held in memory.
///
/// Internally the library writes `bytes` to a managed [`tempfile`] and cleans
/// it up automatically on return or panic.
///
/// # Example
/// ```rust,no_run
/// use pdf_footnote_inline::{convert_from_bytes, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("paper.pdf")?;
/// let output = convert_from_bytes(&bytes, &ConversionConfig::default()).await?;
/// println!("{}", output.text);
/// # Ok(())
/// # }
/// ```
pub async fn convert_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutput, FootnoteError> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| FootnoteError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| FootnoteError::Internal(format!("tempfile write: {e}")))?;
    // `tmp` is dropped (and the file deleted) when `convert` returns
    convert(tmp.path(), config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Join pages with the configured separator.
fn assemble_document(pages: &[PageResult], config: &ConversionConfig) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push_str(&config.page_separator.render(page.page_num));
        }
        out.push_str(&page.text);
    }
    out
}

/// Output format for `path` under `config`.
pub(crate) fn resolve_format(config: &ConversionConfig, path: &Path) -> OutputFormat {
    config
        .output_format
        .or_else(|| OutputFormat::from_path(path))
        .unwrap_or_default()
}

/// Write `bytes` to `<path>.tmp` and rename over `path`.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), FootnoteError> {
    let write_err = |source| FootnoteError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSeparator;
    use crate::layout::{Line, Span};

    fn page(index: usize, text: &str) -> Page {
        Page::new(index, 600.0, 1000.0).with_line(Line::new(100.0, vec![Span::new(text, 11.0)]))
    }

    #[test]
    fn test_pages_joined_with_blank_line() {
        let out = convert_pages(
            &[page(0, "one"), page(1, "two")],
            DocumentMetadata::default(),
            &ConversionConfig::default(),
        );
        assert_eq!(out.text, "one\n\ntwo");
        assert_eq!(out.stats.processed_pages, 2);
        assert_eq!(out.pages[1].page_num, 2);
    }

    #[test]
    fn test_custom_separator_uses_next_page_number() {
        let config = ConversionConfig::builder()
            .page_separator(PageSeparator::PageNumber)
            .build()
            .unwrap();
        let out = convert_pages(
            &[page(0, "one"), page(4, "five")],
            DocumentMetadata::default(),
            &config,
        );
        assert_eq!(out.text, "one\n\n--- page 5 ---\n\nfive");
    }

    #[test]
    fn test_sanitize_toggle() {
        let dirty = [page(0, "a\u{1}b")];
        let on = convert_pages(&dirty, DocumentMetadata::default(), &ConversionConfig::default());
        assert_eq!(on.text, "a b");

        let config = ConversionConfig::builder().sanitize(false).build().unwrap();
        let off = convert_pages(&dirty, DocumentMetadata::default(), &config);
        assert_eq!(off.text, "a\u{1}b");
    }

    #[test]
    fn test_resolve_format() {
        let config = ConversionConfig::default();
        assert_eq!(resolve_format(&config, Path::new("x.docx")), OutputFormat::Docx);
        assert_eq!(resolve_format(&config, Path::new("x.out")), OutputFormat::Rtf);
        assert_eq!(resolve_format(&config, Path::new("x.txt")), OutputFormat::Text);

        let forced = ConversionConfig::builder()
            .output_format(OutputFormat::Rtf)
            .build()
            .unwrap();
        assert_eq!(resolve_format(&forced, Path::new("x.docx")), OutputFormat::Rtf);
    }

    #[tokio::test]
    async fn test_write_atomic_creates_parent_and_leaves_no_tmp() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/out.txt");
        write_atomic(&path, b"hello").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        assert!(!dir.path().join("nested/out.txt.tmp").exists());
    }

    #[tokio::test]
    async fn test_convert_missing_file() {
        let err = convert("/nonexistent/paper.pdf", &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FootnoteError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_convert_from_bytes_rejects_non_pdf() {
        let err = convert_from_bytes(b"not a pdf at all", &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FootnoteError::NotAPdf { .. }));
    }
}
