//! Page partitioning: body text with reference markers vs. footnote lines.

use crate::footnote::numeral::{classify, NumeralKind};
use crate::layout::{Page, Span};
use serde::{Deserialize, Serialize};

/// Decides whether a body span is a footnote reference.
///
/// The default, [`FlaggedNumeralDetector`], trusts the layout provider's
/// superscript flag and checks the numeral grammar. Swap in another
/// implementation to use different signals (font name, baseline offset,
/// Unicode superscript digits) without touching parsing or resolution.
pub trait SuperscriptDetector: Send + Sync {
    /// Numbering space of the reference, or `None` if `span` is not one.
    fn detect(&self, span: &Span) -> Option<NumeralKind>;
}

/// Superscript flag set AND the whole span text is an Arabic or Roman numeral.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlaggedNumeralDetector;

impl SuperscriptDetector for FlaggedNumeralDetector {
    fn detect(&self, span: &Span) -> Option<NumeralKind> {
        if span.superscript {
            classify(&span.text)
        } else {
            None
        }
    }
}

/// A candidate footnote reference inside a page's body text.
///
/// `start..end` are byte offsets into [`PartitionedPage::body`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperscriptMarker {
    pub start: usize,
    pub end: usize,
    /// The reference exactly as printed, e.g. `"12"` or `"iv"`.
    pub literal: String,
    pub kind: NumeralKind,
}

/// Output of [`partition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionedPage {
    /// Body lines joined with `\n`.
    pub body: String,
    pub body_lines: usize,
    pub markers: Vec<SuperscriptMarker>,
    /// Raw footnote-region lines, top to bottom.
    pub footnote_lines: Vec<String>,
}

/// Split `page` at `threshold`: lines whose top lies strictly below it are
/// footnote-region lines, the rest is body.
pub fn partition(
    page: &Page,
    threshold: f32,
    detector: &dyn SuperscriptDetector,
) -> PartitionedPage {
    let mut out = PartitionedPage::default();

    for line in &page.lines {
        if line.y > threshold {
            out.footnote_lines.push(line.text());
            continue;
        }

        if out.body_lines > 0 {
            out.body.push('\n');
        }
        out.body_lines += 1;

        for span in &line.spans {
            let start = out.body.len();
            out.body.push_str(&span.text);
            if let Some(kind) = detector.detect(span) {
                out.markers.push(SuperscriptMarker {
                    start,
                    end: out.body.len(),
                    literal: span.text.clone(),
                    kind,
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Line;

    fn sample_page() -> Page {
        Page::new(0, 600.0, 1000.0)
            .with_line(Line::new(
                100.0,
                vec![
                    Span::new("The claim", 11.0),
                    Span::superscript("1", 7.0),
                    Span::new(" holds.", 11.0),
                ],
            ))
            .with_line(Line::new(
                120.0,
                vec![
                    Span::new("Also this", 11.0),
                    Span::superscript("iv", 7.0),
                    Span::superscript("*", 7.0),
                ],
            ))
            .with_line(Line::new(
                140.0,
                vec![Span::new("Plain 2 is not a marker", 11.0)],
            ))
            .with_line(Line::new(
                900.0,
                vec![Span::superscript("1", 7.0), Span::new(" First note.", 8.0)],
            ))
    }

    #[test]
    fn test_splits_at_threshold() {
        let p = partition(&sample_page(), 600.0, &FlaggedNumeralDetector);
        assert_eq!(p.body_lines, 3);
        assert_eq!(p.footnote_lines, vec!["1 First note.".to_string()]);
        assert_eq!(
            p.body,
            "The claim1 holds.\nAlso thisiv*\nPlain 2 is not a marker"
        );
    }

    #[test]
    fn test_marker_offsets_point_at_literal() {
        let p = partition(&sample_page(), 600.0, &FlaggedNumeralDetector);
        assert_eq!(p.markers.len(), 2, "footnote-region spans are not markers");
        for m in &p.markers {
            assert_eq!(&p.body[m.start..m.end], m.literal);
        }
        assert_eq!(p.markers[0].kind, NumeralKind::Arabic);
        assert_eq!(p.markers[1].kind, NumeralKind::Roman);
        assert_eq!(p.markers[1].literal, "iv");
    }

    #[test]
    fn test_line_on_threshold_is_body() {
        let page = Page::new(0, 600.0, 1000.0)
            .with_line(Line::new(600.0, vec![Span::new("edge", 11.0)]));
        let p = partition(&page, 600.0, &FlaggedNumeralDetector);
        assert_eq!(p.body, "edge");
        assert!(p.footnote_lines.is_empty());
    }

    #[test]
    fn test_custom_detector() {
        struct AnyDigits;
        impl SuperscriptDetector for AnyDigits {
            fn detect(&self, span: &Span) -> Option<NumeralKind> {
                span.text
                    .chars()
                    .all(|c| c.is_ascii_digit())
                    .then_some(NumeralKind::Arabic)
            }
        }
        let page = Page::new(0, 600.0, 1000.0).with_line(Line::new(
            10.0,
            vec![Span::new("x", 11.0), Span::new("3", 11.0)],
        ));
        let p = partition(&page, 600.0, &AnyDigits);
        assert_eq!(p.markers.len(), 1);
        assert_eq!(p.markers[0].start, 1);
    }
}
