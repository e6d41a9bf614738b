//! Configuration types for footnote inlining.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The footnote heuristics themselves
//! live in [`BoundaryConfig`] and [`LayoutConfig`]; this struct groups them
//! with the document-level knobs (pages, password, output format, batch
//! concurrency) so one value describes a whole run.

use crate::error::FootnoteError;
use crate::footnote::{BoundaryConfig, EngineOptions, FlaggedNumeralDetector, SuperscriptDetector};
use crate::layout::pdfium::LayoutConfig;
use crate::progress::ProgressCallback;
use crate::writer::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for a footnote-inlining run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_footnote_inline::{ConversionConfig, OutputFormat};
///
/// let config = ConversionConfig::builder()
///     .default_boundary_ratio(0.65)
///     .output_format(OutputFormat::Docx)
///     .concurrency(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// Page separator in assembled output. Default: blank line.
    pub page_separator: PageSeparator,

    /// Boundary detection thresholds.
    pub boundary: BoundaryConfig,

    /// Character-to-line reconstruction and superscript flagging.
    pub layout: LayoutConfig,

    /// Decides which body spans are footnote references.
    /// Default: [`FlaggedNumeralDetector`].
    pub detector: Arc<dyn SuperscriptDetector>,

    /// Replace non-printable characters with spaces. Default: true.
    pub sanitize: bool,

    /// Output document format. `None` infers it from the output path's
    /// extension, falling back to RTF.
    pub output_format: Option<OutputFormat>,

    /// Number of documents converted at once in batch mode. Default: 4.
    ///
    /// Extraction is CPU-bound and runs on the blocking pool, so values far
    /// above the core count only add memory pressure.
    pub concurrency: usize,

    /// Optional progress callback. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            password: None,
            pages: PageSelection::default(),
            page_separator: PageSeparator::default(),
            boundary: BoundaryConfig::default(),
            layout: LayoutConfig::default(),
            detector: Arc::new(FlaggedNumeralDetector),
            sanitize: true,
            output_format: None,
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pages", &self.pages)
            .field("page_separator", &self.page_separator)
            .field("boundary", &self.boundary)
            .field("layout", &self.layout)
            .field("detector", &"<dyn SuperscriptDetector>")
            .field("sanitize", &self.sanitize)
            .field("output_format", &self.output_format)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The subset of settings the footnote engine needs.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            boundary: self.boundary.clone(),
            detector: Arc::clone(&self.detector),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn boundary(mut self, boundary: BoundaryConfig) -> Self {
        self.config.boundary = boundary;
        self
    }

    /// Fallback boundary as a fraction of page height, clamped to 0.1–0.95.
    pub fn default_boundary_ratio(mut self, ratio: f32) -> Self {
        self.config.boundary.default_ratio = ratio.clamp(0.1, 0.95);
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn detector(mut self, detector: Arc<dyn SuperscriptDetector>) -> Self {
        self.config.detector = detector;
        self
    }

    pub fn sanitize(mut self, v: bool) -> Self {
        self.config.sanitize = v;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = Some(format);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, FootnoteError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(FootnoteError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }

        let b = &c.boundary;
        let ratios = [
            ("default_ratio", b.default_ratio),
            ("min_footnote_ratio", b.min_footnote_ratio),
            ("small_font_below", b.small_font_below),
            ("rule_band_top", b.rule_band_top),
            ("rule_band_bottom", b.rule_band_bottom),
            ("rule_preferred_below", b.rule_preferred_below),
            ("rule_min_width_ratio", b.rule_min_width_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(FootnoteError::InvalidConfig(format!(
                    "boundary.{} must be within 0–1, got {}",
                    name, value
                )));
            }
        }
        if b.rule_band_top >= b.rule_band_bottom {
            return Err(FootnoteError::InvalidConfig(format!(
                "boundary.rule_band_top ({}) must be above rule_band_bottom ({})",
                b.rule_band_top, b.rule_band_bottom
            )));
        }
        if b.margin < 0.0 || b.rule_tolerance < 0.0 {
            return Err(FootnoteError::InvalidConfig(
                "boundary margin and rule tolerance must be non-negative".into(),
            ));
        }

        let l = &c.layout;
        if l.superscript_size_ratio <= 0.0 || l.superscript_size_ratio > 1.0 {
            return Err(FootnoteError::InvalidConfig(format!(
                "layout.superscript_size_ratio must be within (0, 1], got {}",
                l.superscript_size_ratio
            )));
        }
        if l.line_tolerance < 0.0 || l.space_gap_ratio < 0.0 || l.superscript_rise_ratio < 0.0 {
            return Err(FootnoteError::InvalidConfig(
                "layout tolerances must be non-negative".into(),
            ));
        }

        if let PageSelection::Range(start, end) = c.pages {
            if start == 0 || start > end {
                return Err(FootnoteError::InvalidConfig(format!(
                    "Page range {}-{} is empty or not 1-indexed",
                    start, end
                )));
            }
        }

        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF to process.
///
/// Continuations only resolve between pages that are both selected; a
/// footnote split across an excluded page stays split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Process all pages (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

impl std::str::FromStr for PageSelection {
    type Err = FootnoteError;

    /// Parse `"all"`, `"5"`, `"1-10"` or `"1,3,5-7"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let bad = || FootnoteError::InvalidConfig(format!("Invalid page selection: '{}'", s));
        let num = |t: &str| t.trim().parse::<usize>().map_err(|_| bad());

        if !s.contains(',') {
            if let Some((a, b)) = s.split_once('-') {
                return Ok(PageSelection::Range(num(a)?, num(b)?));
            }
            return Ok(PageSelection::Single(num(s)?));
        }

        let mut pages = Vec::new();
        for part in s.split(',').filter(|p| !p.trim().is_empty()) {
            match part.split_once('-') {
                Some((a, b)) => {
                    let (a, b) = (num(a)?, num(b)?);
                    if a == 0 || a > b {
                        return Err(bad());
                    }
                    pages.extend(a..=b);
                }
                None => pages.push(num(part)?),
            }
        }
        Ok(PageSelection::Set(pages))
    }
}

/// How to separate pages in the assembled output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// No marker; pages joined with a blank line. (default)
    #[default]
    None,
    /// Form feed between pages: "\n\x0c\n". Kept even when sanitizing.
    FormFeed,
    /// Page-number line: "\n\n--- page N ---\n\n"
    PageNumber,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator placed before page `page_num` (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::None => "\n\n".to_string(),
            PageSeparator::FormFeed => "\n\x0c\n".to_string(),
            PageSeparator::PageNumber => format!("\n\n--- page {} ---\n\n", page_num),
            PageSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }
}

impl std::str::FromStr for PageSeparator {
    type Err = FootnoteError;

    /// `"none"`, `"formfeed"`, `"page"`, or any other text as a custom separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "" | "none" | "blank" => PageSeparator::None,
            "ff" | "formfeed" => PageSeparator::FormFeed,
            "page" | "number" => PageSeparator::PageNumber,
            _ => PageSeparator::Custom(s.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ConversionConfig::default();
        assert!(c.sanitize);
        assert_eq!(c.concurrency, 4);
        assert_eq!(c.output_format, None);
        assert_eq!(c.boundary.default_ratio, 0.6);
        assert_eq!(c.page_separator, PageSeparator::None);
    }

    #[test]
    fn test_builder_clamps() {
        let c = ConversionConfig::builder()
            .concurrency(0)
            .default_boundary_ratio(2.0)
            .build()
            .unwrap();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.boundary.default_ratio, 0.95);
    }

    #[test]
    fn test_build_rejects_bad_ratios() {
        let bad = BoundaryConfig {
            rule_band_top: 0.9,
            rule_band_bottom: 0.2,
            ..BoundaryConfig::default()
        };
        assert!(matches!(
            ConversionConfig::builder().boundary(bad).build(),
            Err(FootnoteError::InvalidConfig(_))
        ));

        let bad_layout = LayoutConfig {
            superscript_size_ratio: 0.0,
            ..LayoutConfig::default()
        };
        assert!(ConversionConfig::builder().layout(bad_layout).build().is_err());
    }

    #[test]
    fn test_build_rejects_inverted_range() {
        let r = ConversionConfig::builder()
            .pages(PageSelection::Range(5, 2))
            .build();
        assert!(r.is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let c = ConversionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{:?}", c);
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!("all".parse::<PageSelection>().unwrap(), PageSelection::All);
        assert_eq!("7".parse::<PageSelection>().unwrap(), PageSelection::Single(7));
        assert_eq!(
            "2-4".parse::<PageSelection>().unwrap(),
            PageSelection::Range(2, 4)
        );
        assert_eq!(
            "1,3,5-6".parse::<PageSelection>().unwrap(),
            PageSelection::Set(vec![1, 3, 5, 6])
        );
        assert!("x".parse::<PageSelection>().is_err());
        assert!("1,4-2".parse::<PageSelection>().is_err());
    }

    #[test]
    fn test_separator_render() {
        assert_eq!(PageSeparator::None.render(3), "\n\n");
        assert_eq!(PageSeparator::PageNumber.render(3), "\n\n--- page 3 ---\n\n");
        assert_eq!(
            "###".parse::<PageSeparator>().unwrap().render(1),
            "\n\n###\n\n"
        );
    }
}
