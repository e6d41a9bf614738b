//! Orphan continuation resolution (second pass).
//!
//! An orphan is a footnote-region line seen before any footnote was opened on
//! its page, almost always the tail of a footnote that started on an earlier
//! page. Each orphan is attached to the "most recent plausible" footnote:
//! the highest Roman key if the document has any Roman footnotes, otherwise
//! the highest Arabic key.
//!
//! This is an approximation. When several footnotes are mid-continuation at
//! once it can pick the wrong one; fixing that needs extra signals (left
//! margin, font) the layout model does not carry today.

use crate::footnote::table::FootnoteTable;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A footnote-region line with no owner at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orphan {
    /// 0-based index of the page it appeared on.
    pub page: usize,
    pub text: String,
}

/// Counts reported back to the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub attached: usize,
    pub dropped: usize,
}

/// Attach every orphan, in page then line order, to the table.
///
/// Must run after every page's entries have been merged. Orphans are dropped
/// (and counted) only when the table has no entries at all.
pub fn resolve(table: &mut FootnoteTable, orphans: &[Orphan]) -> Resolution {
    let mut outcome = Resolution::default();

    for orphan in orphans {
        let text = orphan.text.trim();
        if text.is_empty() {
            continue;
        }
        let target = table.last_roman().or_else(|| table.last_arabic());

        match target {
            Some(key) if table.append(&key, text) => {
                debug!(
                    "Page {}: orphan continuation attached to footnote {}",
                    orphan.page + 1,
                    key
                );
                outcome.attached += 1;
            }
            _ => {
                warn!(
                    "Page {}: dropping footnote line with no owner: {:?}",
                    orphan.page + 1,
                    text
                );
                outcome.dropped += 1;
            }
        }
    }

    outcome
}
