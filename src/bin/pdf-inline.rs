//! CLI binary for pdf-footnote-inline.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_footnote_inline::{
    convert, convert_batch, convert_to_file, inspect, ConversionConfig,
    ConversionProgressCallback, ConversionStats, NumeralKind, OutputFormat, PageSelection,
    PageSeparator, ProgressCallback,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback. Counts pages for a single document and
/// documents for a batch (batch documents finish out of order).
struct CliProgressCallback {
    bar: ProgressBar,
    batch: AtomicBool,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner first; the bar gets its length once the first start event
    /// tells us how much work there is.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            batch: AtomicBool::new(false),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize, unit: &str, prefix: &'static str) {
        let template = format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  \
             [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {unit}  \
             ⏱ {{elapsed_precise}}  ETA {{eta_precise}}"
        );
        let progress_style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(prefix);
        self.bar.reset_eta();
    }

    fn is_batch(&self) -> bool {
        self.batch.load(Ordering::SeqCst)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.batch.store(true, Ordering::SeqCst);
        self.activate_bar(total_documents, "files", "Batch");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_documents} PDF files…"))
        ));
    }

    fn on_document_start(&self, path: &Path, total_pages: usize) {
        if self.is_batch() {
            self.bar.set_message(file_name(path));
        } else {
            self.activate_bar(total_pages, "pages", "Inlining");
        }
    }

    fn on_page_extracted(&self, page_num: usize, _total_pages: usize) {
        if !self.is_batch() {
            self.bar.set_message(format!("page {page_num}"));
        }
    }

    fn on_page_complete(&self, page_num: usize, total: usize, substitutions: usize) {
        if self.is_batch() {
            return;
        }
        if substitutions > 0 {
            self.bar.println(format!(
                "  {} Page {:>3}/{:<3}  {}",
                green("✓"),
                page_num,
                total,
                dim(&format!("{substitutions} footnotes inlined")),
            ));
        }
        self.bar.inc(1);
    }

    fn on_document_complete(&self, path: &Path, substitutions: usize) {
        if self.is_batch() {
            self.bar.println(format!(
                "  {} {}  {}",
                green("✓"),
                file_name(path),
                dim(&format!("{substitutions} footnotes inlined")),
            ));
            self.bar.inc(1);
        } else {
            self.bar.finish_and_clear();
        }
    }

    fn on_document_error(&self, path: &Path, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // First line only; the rest is remediation advice.
        let first = error.lines().next().unwrap_or(error);
        let msg = if first.chars().count() > 80 {
            format!("{}\u{2026}", first.chars().take(79).collect::<String>())
        } else {
            first.to_string()
        };

        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            file_name(path),
            red(&msg),
        ));
        if self.is_batch() {
            self.bar.inc(1);
        } else {
            self.bar.finish_and_clear();
        }
    }

    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let failed = total_documents.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total_documents {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Inline footnotes, print text to stdout
  pdf-inline paper.pdf

  # Write a Word document (format from extension)
  pdf-inline paper.pdf -o paper.docx

  # Batch: every PDF in a directory → RTF files
  pdf-inline ./papers -o ./out --format rtf

  # Only pages 3-10, page-number separators
  pdf-inline --pages 3-10 --separator page book.pdf -o book.txt

  # Put the fallback boundary lower on pages without any footnote cue
  pdf-inline --default-boundary 0.7 scan.pdf

  # Per-page boundaries and footnote table as JSON
  pdf-inline --json paper.pdf > paper.json

  # Inspect PDF metadata only
  pdf-inline --inspect-only paper.pdf

OUTPUT FORMAT:
  Every resolved reference is replaced with " [Footnote N: text]".
  References with no matching footnote are left as they are.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (else ./, else system library)
  RUST_LOG                Log filter, e.g. pdf_footnote_inline=debug
  PDF_INLINE_*            Any flag, e.g. PDF_INLINE_FORMAT=docx
"#;

/// Inline PDF footnotes at their references.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-inline",
    version,
    about = "Extract PDF text with footnotes inlined at their references",
    long_about = "Extract the body text of PDF documents and move every footnote inline, \
right after the superscript that cites it. Handles Arabic and Roman footnote numbering and \
footnotes that continue onto the next page. Writes plain text, RTF or DOCX.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file, or a directory of PDFs for batch mode.
    input: PathBuf,

    /// Output file (single mode) or directory (batch mode, required).
    #[arg(short, long, env = "PDF_INLINE_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format. Default: from the output extension, else rtf.
    #[arg(short, long, env = "PDF_INLINE_FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// Page selection: all, 5, 3-15, or 1,3,5-7.
    #[arg(long, env = "PDF_INLINE_PAGES", default_value = "all")]
    pages: String,

    /// Page separator: none, formfeed, page, or a custom string.
    #[arg(long, env = "PDF_INLINE_SEPARATOR", default_value = "none")]
    separator: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF_INLINE_PASSWORD")]
    password: Option<String>,

    /// Fallback boundary as a fraction of page height (0.1–0.95).
    #[arg(long, env = "PDF_INLINE_DEFAULT_BOUNDARY")]
    default_boundary: Option<f32>,

    /// Keep non-printable characters instead of replacing them with spaces.
    #[arg(long, env = "PDF_INLINE_NO_SANITIZE")]
    no_sanitize: bool,

    /// Documents converted at once in batch mode.
    #[arg(short, long, env = "PDF_INLINE_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Output structured JSON (ConversionOutput / BatchReport) instead of text.
    #[arg(long, env = "PDF_INLINE_JSON")]
    json: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF_INLINE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_INLINE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_INLINE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Txt,
    Rtf,
    Docx,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Txt => OutputFormat::Text,
            FormatArg::Rtf => OutputFormat::Rtf,
            FormatArg::Docx => OutputFormat::Docx,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would tear through the progress bar; keep them off
    // while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input, cli.password.as_deref())
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Batch mode ───────────────────────────────────────────────────────
    if cli.input.is_dir() {
        let output_dir = cli
            .output
            .as_ref()
            .context("Batch mode needs an output directory: pass -o <DIR>")?;
        let report = convert_batch(&cli.input, output_dir, &config)
            .await
            .context("Batch conversion failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else if !cli.quiet && !show_progress {
            for doc in &report.documents {
                match &doc.error {
                    None => eprintln!("{} {}", green("✓"), doc.input.display()),
                    Some(e) => eprintln!(
                        "{} {}  {}",
                        red("✗"),
                        doc.input.display(),
                        e.lines().next().unwrap_or_default()
                    ),
                }
            }
            eprintln!(
                "Converted {}/{} files in {}ms",
                report.succeeded,
                report.documents.len(),
                report.total_duration_ms
            );
        }

        if !report.documents.is_empty() && report.succeeded == 0 {
            anyhow::bail!("All {} documents failed", report.failed);
        }
        return Ok(());
    }

    // ── Single document ──────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = convert_to_file(&cli.input, output_path, &config)
            .await
            .context("Conversion failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} pages  {}ms  →  {}",
                if stats.unresolved() == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.processed_pages,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
            print_footnote_summary(&stats);
        }
    } else {
        let output = convert(&cli.input, &config)
            .await
            .context("Conversion failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.text.as_bytes())
                .context("Failed to write to stdout")?;
            if !output.text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        if !cli.quiet && !cli.json {
            print_footnote_summary(&output.stats);
        }
    }

    Ok(())
}

fn print_footnote_summary(stats: &ConversionStats) {
    eprintln!(
        "   {} footnotes ({} arabic, {} roman)  /  {} of {} references inlined",
        dim(&(stats.arabic_footnotes + stats.roman_footnotes).to_string()),
        stats.footnotes(NumeralKind::Arabic),
        stats.footnotes(NumeralKind::Roman),
        dim(&stats.substitutions.to_string()),
        stats.markers,
    );
    if stats.orphans_dropped > 0 {
        eprintln!(
            "   {} footnote lines had no footnote to attach to",
            cyan(&stats.orphans_dropped.to_string())
        );
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let pages = parse_pages(&cli.pages)?;
    let separator: PageSeparator = cli
        .separator
        .parse()
        .context("Invalid --separator value")?;

    let mut builder = ConversionConfig::builder()
        .pages(pages)
        .page_separator(separator)
        .sanitize(!cli.no_sanitize)
        .concurrency(cli.concurrency);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ratio) = cli.default_boundary {
        builder = builder.default_boundary_ratio(ratio);
    }
    if let Some(format) = cli.format {
        builder = builder.output_format(format.into());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` into a `PageSelection`, rejecting page 0.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let selection: PageSelection = s.parse().context("Invalid --pages value")?;
    let has_zero = match &selection {
        PageSelection::All => false,
        PageSelection::Single(p) => *p == 0,
        PageSelection::Range(start, _) => *start == 0,
        PageSelection::Set(pages) => pages.contains(&0),
    };
    if has_zero {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got '{}')", s);
    }
    Ok(selection)
}
