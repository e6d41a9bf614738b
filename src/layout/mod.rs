//! Page layout model consumed by the footnote engine.
//!
//! The engine never talks to a PDF library directly. It reads [`Page`]s:
//! lines of styled spans in top-down coordinates, plus the thin drawn
//! segments that typically separate body text from footnotes. Anything that
//! can produce these (pdfium, a test fixture, a different PDF backend) plugs
//! in through [`LayoutProvider`].
//!
//! Coordinates are in PDF points with the origin at the **top-left** corner,
//! so `y` grows downward. Backends that use the PDF bottom-up convention must
//! flip before building a [`Page`].

pub mod pdfium;

use crate::error::FootnoteError;
use serde::{Deserialize, Serialize};

/// A run of text sharing one font size and one superscript state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub font_size: f32,
    /// Raised above the baseline in a smaller size.
    pub superscript: bool,
}

impl Span {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            superscript: false,
        }
    }

    pub fn superscript(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
            superscript: true,
        }
    }
}

/// One visual text line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Top edge of the line's bounding box.
    pub y: f32,
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new(y: f32, spans: Vec<Span>) -> Self {
        Self { y, spans }
    }

    /// Concatenated text of all spans, in order.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A drawn straight segment (candidate footnote rule).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Segment {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn horizontal(x0: f32, x1: f32, y: f32) -> Self {
        Self::new(x0, y, x1, y)
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    pub fn top(&self) -> f32 {
        self.y0.min(self.y1)
    }
}

/// Everything the engine needs to know about one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 0-based index of the page in the source document.
    pub index: usize,
    pub width: f32,
    pub height: f32,
    /// Lines in reading order (top to bottom).
    pub lines: Vec<Line>,
    pub segments: Vec<Segment>,
}

impl Page {
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            lines: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }
}

/// Source of [`Page`]s for one document.
///
/// Implementations are blocking; the async driver calls them from
/// `spawn_blocking`.
pub trait LayoutProvider {
    fn page_count(&self) -> usize;

    /// Extract the page at the 0-based `index`.
    fn page(&self, index: usize) -> Result<Page, FootnoteError>;
}

/// A provider over pages that are already in memory.
impl LayoutProvider for Vec<Page> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page(&self, index: usize) -> Result<Page, FootnoteError> {
        self.get(index)
            .cloned()
            .ok_or(FootnoteError::PageOutOfRange {
                page: index + 1,
                total: self.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_text_concatenates_spans() {
        let line = Line::new(
            10.0,
            vec![
                Span::new("Hello", 11.0),
                Span::superscript("2", 7.0),
                Span::new(" world", 11.0),
            ],
        );
        assert_eq!(line.text(), "Hello2 world");
    }

    #[test]
    fn segment_geometry() {
        let s = Segment::new(300.0, 501.0, 72.0, 500.0);
        assert_eq!(s.width(), 228.0);
        assert_eq!(s.top(), 500.0);
    }

    #[test]
    fn vec_provider_reports_out_of_range() {
        let pages = vec![Page::new(0, 612.0, 792.0)];
        assert_eq!(pages.page_count(), 1);
        assert!(pages.page(0).is_ok());
        match pages.page(3) {
            Err(FootnoteError::PageOutOfRange { page, total }) => {
                assert_eq!((page, total), (4, 1));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
