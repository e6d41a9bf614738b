//! Footnote boundary detection: one y-coordinate per page.
//!
//! No single layout signal is reliable on its own, so the detector runs a
//! cascade and stops at the first heuristic that yields a value:
//!
//! 1. **Rule line** — a drawn horizontal separator in the middle band.
//! 2. **Numeral pattern** — the topmost line in the lower part of the page
//!    that starts like a footnote (`"1. "`, `"iv "`).
//! 3. **Font size** — the smallest font on the page clusters in the lower half.
//! 4. **Default** — a fixed fraction of the page height.
//!
//! Every heuristic is floored so that the top part of the page is always body
//! text; misreading the end of a paragraph as footnotes is worse than leaving
//! a footnote in the body.

use crate::footnote::numeral::leading_numeral;
use crate::layout::Page;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tuning knobs for [`detect_boundary`]. Ratios are fractions of page
/// height unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Max vertical deviation (points) for a segment to count as horizontal. Default: 2.
    pub rule_tolerance: f32,
    /// Min segment length as a fraction of page *width*. Default: 0.3.
    pub rule_min_width_ratio: f32,
    /// Upper edge of the band where rules are considered. Default: 0.2.
    pub rule_band_top: f32,
    /// Lower edge of the band where rules are considered. Default: 0.8.
    pub rule_band_bottom: f32,
    /// Rules below this are preferred (longest wins). Default: 0.5.
    pub rule_preferred_below: f32,
    /// Numeral lines must start below this; also the floor for heuristics 2–3. Default: 0.4.
    pub min_footnote_ratio: f32,
    /// Smallest font's mean y must be below this. Default: 0.5.
    pub small_font_below: f32,
    /// Points subtracted above the first footnote line. Default: 5.
    pub margin: f32,
    /// Fallback boundary. Default: 0.6.
    pub default_ratio: f32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            rule_tolerance: 2.0,
            rule_min_width_ratio: 0.3,
            rule_band_top: 0.2,
            rule_band_bottom: 0.8,
            rule_preferred_below: 0.5,
            min_footnote_ratio: 0.4,
            small_font_below: 0.5,
            margin: 5.0,
            default_ratio: 0.6,
        }
    }
}

/// Which heuristic decided the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundarySource {
    RuleLine,
    NumeralPattern,
    FontSize,
    Default,
}

impl fmt::Display for BoundarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BoundarySource::RuleLine => "rule line",
            BoundarySource::NumeralPattern => "numeral pattern",
            BoundarySource::FontSize => "font size",
            BoundarySource::Default => "default",
        };
        f.write_str(s)
    }
}

/// The chosen split between body and footnote region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub y: f32,
    pub source: BoundarySource,
}

/// Decide where the footnote region of `page` starts.
///
/// The result is always within `0..=page.height`.
pub fn detect_boundary(page: &Page, config: &BoundaryConfig) -> Boundary {
    let height = page.height.max(0.0);

    let (y, source) = if let Some(y) = rule_line(page, config) {
        (y, BoundarySource::RuleLine)
    } else if let Some(y) = numeral_pattern(page, config) {
        (y, BoundarySource::NumeralPattern)
    } else if let Some(y) = font_size(page, config) {
        (y, BoundarySource::FontSize)
    } else {
        (height * config.default_ratio, BoundarySource::Default)
    };

    Boundary {
        y: y.clamp(0.0, height),
        source,
    }
}

fn rule_line(page: &Page, config: &BoundaryConfig) -> Option<f32> {
    let band_top = page.height * config.rule_band_top;
    let band_bottom = page.height * config.rule_band_bottom;
    let min_width = page.width * config.rule_min_width_ratio;

    let candidates: Vec<(f32, f32)> = page
        .segments
        .iter()
        .filter(|s| (s.y0 - s.y1).abs() < config.rule_tolerance && s.width() > min_width)
        .map(|s| (s.top(), s.width()))
        .filter(|&(y, _)| y > band_top && y < band_bottom)
        .collect();

    let preferred_below = page.height * config.rule_preferred_below;
    let longest_low = candidates
        .iter()
        .filter(|&&(y, _)| y > preferred_below)
        .max_by(|a, b| a.1.total_cmp(&b.1));
    if let Some(&(y, _)) = longest_low {
        return Some(y);
    }

    candidates
        .iter()
        .map(|&(y, _)| y)
        .max_by(f32::total_cmp)
}

fn numeral_pattern(page: &Page, config: &BoundaryConfig) -> Option<f32> {
    let floor = page.height * config.min_footnote_ratio;
    page.lines
        .iter()
        .filter(|l| l.y > floor && leading_numeral(&l.text()).is_some())
        .map(|l| l.y)
        .min_by(f32::total_cmp)
        .map(|top| (top - config.margin).max(floor))
}

/// Font sizes are bucketed to a tenth of a point; extraction jitter would
/// otherwise split one size into several.
fn size_bucket(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

fn font_size(page: &Page, config: &BoundaryConfig) -> Option<f32> {
    let mut positions: BTreeMap<i32, Vec<f32>> = BTreeMap::new();
    for line in &page.lines {
        for span in &line.spans {
            positions
                .entry(size_bucket(span.font_size))
                .or_default()
                .push(line.y);
        }
    }
    if positions.len() < 2 {
        return None;
    }

    // BTreeMap is ordered by size, so the first entry is the smallest font.
    let (_, smallest) = positions.iter().next()?;
    let mean = smallest.iter().sum::<f32>() / smallest.len() as f32;
    if mean <= page.height * config.small_font_below {
        return None;
    }

    let floor = page.height * config.min_footnote_ratio;
    smallest
        .iter()
        .copied()
        .min_by(f32::total_cmp)
        .map(|top| (top - config.margin).max(floor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Line, Segment, Span};

    fn page() -> Page {
        Page::new(0, 600.0, 1000.0)
    }

    fn body(y: f32, text: &str) -> Line {
        Line::new(y, vec![Span::new(text, 11.0)])
    }

    #[test]
    fn test_default_when_no_signal() {
        let p = page()
            .with_line(body(100.0, "Plain body text"))
            .with_line(body(700.0, "More body text"));
        let b = detect_boundary(&p, &BoundaryConfig::default());
        assert_eq!(b.source, BoundarySource::Default);
        assert_eq!(b.y, 600.0);
    }

    #[test]
    fn test_rule_prefers_longest_in_bottom_half() {
        let p = page()
            .with_segment(Segment::horizontal(50.0, 300.0, 550.0))
            .with_segment(Segment::horizontal(50.0, 500.0, 650.0))
            .with_segment(Segment::horizontal(50.0, 550.0, 300.0));
        let b = detect_boundary(&p, &BoundaryConfig::default());
        assert_eq!(b.source, BoundarySource::RuleLine);
        assert_eq!(b.y, 650.0);
    }

    #[test]
    fn test_rule_falls_back_to_lowest_in_band() {
        let p = page()
            .with_segment(Segment::horizontal(50.0, 500.0, 250.0))
            .with_segment(Segment::horizontal(50.0, 300.0, 450.0));
        let b = detect_boundary(&p, &BoundaryConfig::default());
        assert_eq!(b.y, 450.0);
    }

    #[test]
    fn test_rule_ignores_short_slanted_and_out_of_band() {
        let p = page()
            // too short (< 30% of 600)
            .with_segment(Segment::horizontal(50.0, 150.0, 700.0))
            // slanted
            .with_segment(Segment::new(50.0, 600.0, 500.0, 610.0))
            // outside the 20–80% band
            .with_segment(Segment::horizontal(50.0, 500.0, 900.0))
            .with_segment(Segment::horizontal(50.0, 500.0, 100.0));
        let b = detect_boundary(&p, &BoundaryConfig::default());
        assert_ne!(b.source, BoundarySource::RuleLine);
    }

    #[test]
    fn test_numeral_pattern_topmost_minus_margin() {
        let p = page()
            .with_line(body(100.0, "1. Heading numbered like a footnote"))
            .with_line(body(300.0, "Body"))
            .with_line(body(820.0, "1. First note"))
            .with_line(body(860.0, "ii. Second note"));
        let b = detect_boundary(&p, &BoundaryConfig::default());
        assert_eq!(b.source, BoundarySource::NumeralPattern);
        assert_eq!(b.y, 815.0);
    }

    #[test]
    fn test_numeral_pattern_floored() {
        let p = page().with_line(body(402.0, "3 Close to the floor"));
        let b = detect_boundary(&p, &BoundaryConfig::default());
        assert_eq!(b.source, BoundarySource::NumeralPattern);
        assert_eq!(b.y, 400.0);
    }

    #[test]
    fn test_font_size_smallest_in_lower_half() {
        let p = page()
            .with_line(body(100.0, "Body"))
            .with_line(body(200.0, "Body"))
            .with_line(Line::new(850.0, vec![Span::new("A small note", 8.0)]))
            .with_line(Line::new(870.0, vec![Span::new("another small", 8.0)]));
        let b = detect_boundary(&p, &BoundaryConfig::default());
        assert_eq!(b.source, BoundarySource::FontSize);
        assert_eq!(b.y, 845.0);
    }

    #[test]
    fn test_font_size_skipped_when_small_font_is_high() {
        let p = page()
            .with_line(Line::new(80.0, vec![Span::new("Small caption", 8.0)]))
            .with_line(body(500.0, "Body"));
        let b = detect_boundary(&p, &BoundaryConfig::default());
        assert_eq!(b.source, BoundarySource::Default);
    }

    #[test]
    fn test_boundary_within_page() {
        let cfg = BoundaryConfig {
            default_ratio: 1.7,
            ..BoundaryConfig::default()
        };
        let b = detect_boundary(&page(), &cfg);
        assert_eq!(b.y, 1000.0);
    }
}
