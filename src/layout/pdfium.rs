//! [`LayoutProvider`] backed by pdfium.
//!
//! pdfium hands out individual characters with bounding boxes in PDF space
//! (origin bottom-left). Line and span reconstruction is done here, in plain
//! Rust over [`Glyph`]s, so it can be tested without a pdfium library.
//!
//! ## Why spawn_blocking?
//!
//! pdfium keeps thread-local state and every call blocks. Callers in async
//! code must drive [`PdfiumDocument`] from `tokio::task::spawn_blocking`;
//! see [`crate::pipeline::extract`].

use crate::error::FootnoteError;
use crate::layout::{LayoutProvider, Line, Page, Segment, Span};
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable pointing at a specific pdfium shared library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Geometry knobs for turning characters into lines and spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Extra vertical slack (points) when deciding whether a glyph belongs to
    /// the current line. Default: 2.
    pub line_tolerance: f32,
    /// A glyph is superscript only if its size is below this fraction of the
    /// line's dominant size. Default: 0.85.
    pub superscript_size_ratio: f32,
    /// ...and its baseline sits at least this fraction of the dominant size
    /// above the line baseline. Default: 0.15.
    pub superscript_rise_ratio: f32,
    /// Horizontal gap, as a fraction of the line's mean glyph width, that
    /// becomes a space. Default: 0.3.
    pub space_gap_ratio: f32,
    /// Path objects thinner than this (points) count as rules. Default: 2.
    pub rule_thickness: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 2.0,
            superscript_size_ratio: 0.85,
            superscript_rise_ratio: 0.15,
            space_gap_ratio: 0.3,
            rule_thickness: 2.0,
        }
    }
}

// ── Binding ──────────────────────────────────────────────────────────────

/// Bind pdfium: `PDFIUM_LIB_PATH` first, then the working directory, then
/// the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, FootnoteError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => Pdfium::bind_to_library(path.trim()),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    };

    bindings
        .map(Pdfium::new)
        .map_err(|e| FootnoteError::PdfiumBindingFailed(format!("{:?}", e)))
}

// ── Document ─────────────────────────────────────────────────────────────

/// An open PDF document.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
    config: LayoutConfig,
}

impl<'a> PdfiumDocument<'a> {
    /// Open `path`. Password failures are told apart from corrupt files.
    pub fn open(
        pdfium: &'a Pdfium,
        path: &Path,
        password: Option<&'a str>,
        config: LayoutConfig,
    ) -> Result<Self, FootnoteError> {
        let document = pdfium
            .load_pdf_from_file(path, password)
            .map_err(|e| load_error(path, password, e))?;
        info!("PDF loaded: {} pages", document.pages().len());
        Ok(Self { document, config })
    }

    pub fn metadata(&self) -> DocumentMetadata {
        let metadata = self.document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().trim().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
            modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
            page_count: self.document.pages().len() as usize,
            pdf_version: format!("{:?}", self.document.version()),
        }
    }
}

impl LayoutProvider for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page(&self, index: usize) -> Result<Page, FootnoteError> {
        let total = self.page_count();
        if index >= total {
            return Err(FootnoteError::PageOutOfRange {
                page: index + 1,
                total,
            });
        }

        let failed = |e: PdfiumError| FootnoteError::LayoutExtractionFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        };

        let page = self.document.pages().get(index as u16).map_err(failed)?;
        let width = page.width().value;
        let height = page.height().value;

        let text = page.text().map_err(failed)?;
        let mut glyphs = Vec::new();
        for ch in text.chars().iter() {
            let Some(c) = ch.unicode_char() else {
                continue;
            };
            let Ok(rect) = ch.tight_bounds().or_else(|_| ch.loose_bounds()) else {
                continue;
            };
            glyphs.push(Glyph {
                ch: c,
                left: rect.left().value,
                right: rect.right().value,
                // Flip to top-down.
                top: height - rect.top().value,
                bottom: height - rect.bottom().value,
                size: ch.scaled_font_size().value,
            });
        }

        let mut segments = Vec::new();
        for object in page.objects().iter() {
            if object.object_type() != PdfPageObjectType::Path {
                continue;
            }
            let Ok(bounds) = object.bounds() else {
                continue;
            };
            let rect = bounds.to_rect();
            let (y_top, y_bottom) = (height - rect.top().value, height - rect.bottom().value);
            if (y_bottom - y_top).abs() <= self.config.rule_thickness {
                segments.push(Segment::new(
                    rect.left().value,
                    y_top,
                    rect.right().value,
                    y_bottom,
                ));
            }
        }

        let lines = build_lines(glyphs, &self.config);
        debug!(
            "Page {}: {} lines, {} thin path segments",
            index + 1,
            lines.len(),
            segments.len()
        );

        Ok(Page {
            index,
            width,
            height,
            lines,
            segments,
        })
    }
}

fn load_error(path: &Path, password: Option<&str>, e: PdfiumError) -> FootnoteError {
    let err_str = format!("{:?}", e);
    if err_str.to_lowercase().contains("password") {
        if password.is_some() {
            FootnoteError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            FootnoteError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        FootnoteError::CorruptPdf {
            path: path.to_path_buf(),
            detail: err_str,
        }
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────

/// One character in top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    /// Baseline-ish lower edge; larger is lower on the page.
    pub bottom: f32,
    pub size: f32,
}

impl Glyph {
    fn center(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }
}

/// Group glyphs into lines (top to bottom) of styled spans.
pub fn build_lines(mut glyphs: Vec<Glyph>, config: &LayoutConfig) -> Vec<Line> {
    glyphs.retain(|g| !g.ch.is_control());
    glyphs.sort_by(|a, b| a.center().total_cmp(&b.center()));

    let mut groups: Vec<Vec<Glyph>> = Vec::new();
    let mut line_bottom = f32::NEG_INFINITY;
    for g in glyphs {
        match groups.last_mut() {
            Some(current) if g.center() <= line_bottom + config.line_tolerance => {
                line_bottom = line_bottom.max(g.bottom);
                current.push(g);
            }
            _ => {
                line_bottom = g.bottom;
                groups.push(vec![g]);
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|g| build_line(g, config))
        .collect()
}

fn build_line(mut glyphs: Vec<Glyph>, config: &LayoutConfig) -> Option<Line> {
    glyphs.sort_by(|a, b| a.left.total_cmp(&b.left));

    let ink: Vec<&Glyph> = glyphs.iter().filter(|g| !g.ch.is_whitespace()).collect();
    if ink.is_empty() {
        return None;
    }

    let dominant = dominant_size(&ink);
    let baseline = line_baseline(&ink, dominant);
    let mean_width = ink.iter().map(|g| g.width()).sum::<f32>() / ink.len() as f32;
    let gap = mean_width * config.space_gap_ratio;
    let y = ink.iter().map(|g| g.top).fold(f32::INFINITY, f32::min);

    let is_superscript = |g: &Glyph| {
        g.size < dominant * config.superscript_size_ratio
            && baseline - g.bottom >= dominant * config.superscript_rise_ratio
    };

    let mut spans: Vec<Span> = Vec::new();
    let mut prev_right: Option<f32> = None;
    for g in &glyphs {
        let (size, superscript) = if g.ch.is_whitespace() {
            (dominant, false)
        } else {
            (g.size, is_superscript(g))
        };

        if let Some(right) = prev_right {
            if !g.ch.is_whitespace() && g.left - right > gap {
                push_char(&mut spans, ' ', dominant, false);
            }
        }
        push_char(&mut spans, g.ch, size, superscript);
        prev_right = Some(g.right);
    }

    Some(Line::new(y, spans))
}

/// Append `ch`, starting a new span when the style changes. Whitespace never
/// opens a span of its own and never doubles up.
fn push_char(spans: &mut Vec<Span>, ch: char, size: f32, superscript: bool) {
    if ch.is_whitespace() {
        match spans.last_mut() {
            Some(last) if last.text.ends_with(' ') => return,
            Some(last) if !last.superscript => {
                last.text.push(' ');
                return;
            }
            None => return,
            Some(_) => {
                spans.push(Span::new(" ", size));
                return;
            }
        }
    }

    match spans.last_mut() {
        Some(last) if last.superscript == superscript && same_size(last, size) => {
            last.text.push(ch);
        }
        _ => spans.push(Span {
            text: ch.to_string(),
            font_size: size,
            superscript,
        }),
    }
}

fn same_size(span: &Span, size: f32) -> bool {
    if span.text.trim().is_empty() {
        return !span.superscript;
    }
    (span.font_size - size).abs() < 0.1
}

/// Glyphs whose tight box ends on the baseline. Descenders and brackets
/// hang below it.
fn sits_on_baseline(ch: char) -> bool {
    ch.is_alphanumeric() && !"gjpqyQJ".contains(ch)
}

/// Baseline of the dominant-size text: the most common bottom edge among
/// dominant-size glyphs that sit on it (ties go to the lower edge). Falls
/// back to every dominant-size glyph when none qualifies.
fn line_baseline(ink: &[&Glyph], dominant: f32) -> f32 {
    let body: Vec<&Glyph> = ink
        .iter()
        .copied()
        .filter(|g| (g.size - dominant).abs() <= dominant * 0.1)
        .collect();
    let on_line: Vec<&Glyph> = body
        .iter()
        .copied()
        .filter(|g| sits_on_baseline(g.ch))
        .collect();
    let pool = if on_line.is_empty() { &body } else { &on_line };

    let mut counts: std::collections::BTreeMap<i32, usize> = std::collections::BTreeMap::new();
    for g in pool {
        *counts.entry((g.bottom * 10.0).round() as i32).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(bucket, _)| bucket as f32 / 10.0)
        .unwrap_or(f32::NEG_INFINITY)
}

/// Most common size among `glyphs`, bucketed to 0.1pt.
fn dominant_size(glyphs: &[&Glyph]) -> f32 {
    let mut counts: std::collections::BTreeMap<i32, usize> = std::collections::BTreeMap::new();
    for g in glyphs {
        *counts.entry((g.size * 10.0).round() as i32).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(bucket, _)| bucket as f32 / 10.0)
        .unwrap_or(0.0)
}
