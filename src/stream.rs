//! Batch conversion: every PDF in a directory, one output file each.
//!
//! [`convert_batch_stream`] yields a [`DocumentResult`] per input as each
//! document finishes, with up to `config.concurrency` documents in flight.
//! Results arrive in completion order; [`convert_batch`] collects them into
//! a [`BatchReport`] sorted by input path.
//!
//! A failing document never aborts the batch. Its error is logged, reported
//! to the progress callback, and recorded in its result.

use crate::config::ConversionConfig;
use crate::convert::{convert, write_atomic};
use crate::error::FootnoteError;
use crate::output::{BatchReport, DocumentResult};
use crate::pipeline::input;
use crate::writer::OutputFormat;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::Stream;
use tracing::{error, info};

/// A boxed stream of per-document results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = DocumentResult> + Send>>;

/// Convert every `*.pdf` in `input_dir` into `output_dir`, streaming results.
///
/// Output files keep the input's base name with the extension of
/// `config.output_format` (RTF when unset). `output_dir` is created
/// if missing.
///
/// # Returns
/// - `Ok(DocumentStream)` — one item per input PDF
/// - `Err(FootnoteError)` — `input_dir` is missing or not a directory, or
///   `output_dir` cannot be created
pub async fn convert_batch_stream(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentStream, FootnoteError> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref().to_path_buf();
    info!(
        "Starting batch: {} → {}",
        input_dir.display(),
        output_dir.display()
    );

    // ── Collect inputs ───────────────────────────────────────────────────
    let pdfs = input::collect_pdfs(input_dir)?;

    // ── Prepare output directory ─────────────────────────────────────────
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|e| FootnoteError::OutputWriteFailed {
            path: output_dir.clone(),
            source: e,
        })?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(pdfs.len());
    }

    // ── Build the stream ─────────────────────────────────────────────────
    let format = config.output_format.unwrap_or_default();
    let concurrency = config.concurrency;
    let config = Arc::new(config.clone());
    let output_dir = Arc::new(output_dir);

    let s = stream::iter(pdfs.into_iter().map(move |pdf| {
        let cfg = Arc::clone(&config);
        let out_dir = Arc::clone(&output_dir);
        async move { convert_one(pdf, &out_dir, format, &cfg).await }
    }))
    .buffer_unordered(concurrency);

    Ok(Box::pin(s))
}

/// Convert a directory of PDFs and wait for all of them.
pub async fn convert_batch(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchReport, FootnoteError> {
    let start = Instant::now();
    let results: Vec<DocumentResult> = convert_batch_stream(input_dir, output_dir, config)
        .await?
        .collect()
        .await;

    let report = BatchReport::from_results(results, start.elapsed().as_millis() as u64);
    info!(
        "Batch complete: {} succeeded, {} failed, {}ms",
        report.succeeded, report.failed, report.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(report.documents.len(), report.succeeded);
    }
    Ok(report)
}

/// `<output_dir>/<input stem>.<format extension>`
pub fn output_path_for(input: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".");
    name.push(format.extension());
    output_dir.join(name)
}

async fn convert_one(
    input: PathBuf,
    output_dir: &Path,
    format: OutputFormat,
    config: &ConversionConfig,
) -> DocumentResult {
    let output_path = output_path_for(&input, output_dir, format);

    let written = async {
        let output = convert(&input, config).await?;
        let bytes = format.render(&output.text)?;
        write_atomic(&output_path, &bytes).await?;
        Ok::<_, FootnoteError>(output.stats)
    }
    .await;

    match written {
        Ok(stats) => {
            info!("{} → {}", input.display(), output_path.display());
            DocumentResult {
                input,
                output: Some(output_path),
                stats: Some(stats),
                error: None,
            }
        }
        Err(e) => {
            error!("Failed to convert {}: {}", input.display(), e);
            // `convert` already reported its own failures.
            if matches!(
                e,
                FootnoteError::OutputWriteFailed { .. } | FootnoteError::EncodeFailed { .. }
            ) {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_error(&input, &e.to_string());
                }
            }
            DocumentResult {
                input,
                output: None,
                stats: None,
                error: Some(e.to_string()),
            }
        }
    }
}
