//! The footnote engine.
//!
//! ## Passes
//!
//! ```text
//! pages ──▶ [1] per page: boundary → partition → parse region
//!                    │            │                 │
//!                    │            └─ body + markers │
//!                    │                              ├─ entries ─▶ FootnoteTable
//!                    │                              └─ orphans ─┐
//!           [2] resolve orphans against the full table ◀────────┘
//!           [3] per page: substitute markers (right to left)
//! ```
//!
//! Pass 1 must see every page before pass 2 runs, and pass 2 must finish
//! before any substitution: a reference on page 1 may point at a footnote
//! printed on page 3, or at one whose tail only appears on page 4.
//!
//! Everything here is synchronous and I/O free. The async driver in
//! [`crate::convert`] extracts pages and calls [`process_pages`].

pub mod boundary;
pub mod numeral;
pub mod parser;
pub mod partition;
pub mod resolver;
pub mod substitute;
pub mod table;

pub use boundary::{detect_boundary, Boundary, BoundaryConfig, BoundarySource};
pub use numeral::{FootnoteKey, NumeralKind};
pub use parser::{parse_region, FootnoteEntry, ParsedRegion};
pub use partition::{
    partition, FlaggedNumeralDetector, PartitionedPage, SuperscriptDetector, SuperscriptMarker,
};
pub use resolver::{resolve, Orphan, Resolution};
pub use substitute::{inline_footnote, substitute_page, Substitution};
pub use table::FootnoteTable;

use crate::layout::Page;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Knobs for [`process_pages`].
#[derive(Clone)]
pub struct EngineOptions {
    pub boundary: BoundaryConfig,
    pub detector: Arc<dyn SuperscriptDetector>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            boundary: BoundaryConfig::default(),
            detector: Arc::new(FlaggedNumeralDetector),
        }
    }
}

impl std::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("boundary", &self.boundary)
            .field("detector", &"<dyn SuperscriptDetector>")
            .finish()
    }
}

/// One page after all three passes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlinedPage {
    /// 0-based index, as carried by the input [`Page`].
    pub index: usize,
    pub boundary: Boundary,
    pub body_lines: usize,
    pub footnote_lines: usize,
    /// Candidate references found in the body.
    pub markers: usize,
    /// References actually replaced.
    pub substituted: usize,
    /// Body text with footnotes inlined.
    pub text: String,
}

/// The engine's result for a whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlinedDocument {
    pub pages: Vec<InlinedPage>,
    pub footnotes: FootnoteTable,
    pub resolution: Resolution,
}

impl InlinedDocument {
    pub fn markers(&self) -> usize {
        self.pages.iter().map(|p| p.markers).sum()
    }

    pub fn substituted(&self) -> usize {
        self.pages.iter().map(|p| p.substituted).sum()
    }
}

/// Run boundary detection, parsing, continuation resolution and
/// substitution over `pages`, in that order.
pub fn process_pages(pages: &[Page], options: &EngineOptions) -> InlinedDocument {
    let mut table = FootnoteTable::new();
    let mut orphans = Vec::new();
    let mut staged = Vec::with_capacity(pages.len());

    // ── Pass 1: partition and parse ──────────────────────────────────────
    for page in pages {
        let boundary = detect_boundary(page, &options.boundary);
        let pct = if page.height > 0.0 {
            boundary.y / page.height * 100.0
        } else {
            0.0
        };
        debug!(
            "Page {}: footnote boundary at {:.1} ({:.1}% from top, {})",
            page.index + 1,
            boundary.y,
            pct,
            boundary.source
        );

        let parts = partition(page, boundary.y, options.detector.as_ref());
        let region = parse_region(&parts.footnote_lines);
        debug!(
            "Page {}: {} body lines, {} markers, {} footnote entries, {} orphan lines",
            page.index + 1,
            parts.body_lines,
            parts.markers.len(),
            region.entries.len(),
            region.orphans.len()
        );

        region.merge_into(&mut table);
        orphans.extend(region.orphans.into_iter().map(|text| Orphan {
            page: page.index,
            text,
        }));
        staged.push((page.index, boundary, parts));
    }

    // ── Pass 2: continuations ────────────────────────────────────────────
    let resolution = resolve(&mut table, &orphans);

    // ── Pass 3: substitution ─────────────────────────────────────────────
    let pages = staged
        .into_iter()
        .map(|(index, boundary, parts)| {
            let sub = substitute_page(&parts.body, &parts.markers, &table);
            InlinedPage {
                index,
                boundary,
                body_lines: parts.body_lines,
                footnote_lines: parts.footnote_lines.len(),
                markers: parts.markers.len(),
                substituted: sub.replaced,
                text: sub.text,
            }
        })
        .collect();

    InlinedDocument {
        pages,
        footnotes: table,
        resolution,
    }
}
