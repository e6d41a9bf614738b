//! Footnote-region parsing: one small state machine per page.
//!
//! ```text
//!            initiating line                 initiating line
//!   Idle ───────────────────────▶ Open ◀──────────────────────┐
//!    │                             │  (flush, reopen)         │
//!    │ other line                  ├──────────────────────────┘
//!    ▼                             │ other line: append
//!  orphan                          ▼
//!                               end of region: flush
//! ```
//!
//! State never survives the end of a page. Text that continues a footnote
//! onto the next page arrives there as an orphan (no open entry yet) and is
//! attached later by [`crate::footnote::resolver`].

use crate::footnote::numeral::{split_entry_line, FootnoteKey};
use crate::footnote::table::FootnoteTable;
use serde::{Deserialize, Serialize};

/// A flushed entry, ready to merge into the document table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteEntry {
    pub key: FootnoteKey,
    pub text: String,
}

/// Everything one page's footnote region contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRegion {
    /// Entries in flush order. A key may appear twice if the page numbers it
    /// twice; [`FootnoteTable::merge`] joins them.
    pub entries: Vec<FootnoteEntry>,
    /// Lines seen before any entry was opened on this page.
    pub orphans: Vec<String>,
}

impl ParsedRegion {
    /// Merge this page's entries into `table`.
    pub fn merge_into(&self, table: &mut FootnoteTable) {
        for entry in &self.entries {
            table.merge(entry.key.clone(), &entry.text);
        }
    }
}

enum State {
    Idle,
    Open { key: FootnoteKey, buffer: String },
}

/// Parse one page's footnote-region lines, top to bottom.
pub fn parse_region<S: AsRef<str>>(lines: &[S]) -> ParsedRegion {
    let mut region = ParsedRegion::default();
    let mut state = State::Idle;

    for line in lines {
        let line = line.as_ref();
        state = match (split_entry_line(line), state) {
            (Some((key, rest)), previous) => {
                flush(previous, &mut region);
                State::Open {
                    key,
                    buffer: rest.to_string(),
                }
            }
            (None, State::Open { key, mut buffer }) => {
                buffer.push(' ');
                buffer.push_str(line);
                State::Open { key, buffer }
            }
            (None, State::Idle) => {
                region.orphans.push(line.to_string());
                State::Idle
            }
        };
    }

    flush(state, &mut region);
    region
}

fn flush(state: State, region: &mut ParsedRegion) {
    if let State::Open { key, buffer } = state {
        region.entries.push(FootnoteEntry { key, text: buffer });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_of(region: &ParsedRegion) -> FootnoteTable {
        let mut t = FootnoteTable::new();
        region.merge_into(&mut t);
        t
    }

    #[test]
    fn test_continuation_appends_to_open_entry() {
        let region = parse_region(&["1. Alpha", "continues alpha", "2. Beta"]);
        assert!(region.orphans.is_empty());
        let t = table_of(&region);
        assert_eq!(t.get(&FootnoteKey::Arabic(1)), Some("Alpha continues alpha"));
        assert_eq!(t.get(&FootnoteKey::Arabic(2)), Some("Beta"));
    }

    #[test]
    fn test_leading_lines_are_orphans() {
        let region = parse_region(&["tail of a note", "from the last page", "3. Gamma"]);
        assert_eq!(region.orphans, vec!["tail of a note", "from the last page"]);
        assert_eq!(region.entries.len(), 1);
    }

    #[test]
    fn test_roman_and_arabic_coexist() {
        let region = parse_region(&["1. Note one.", "ii. Note two roman."]);
        let t = table_of(&region);
        assert_eq!(t.arabic.len(), 1);
        assert_eq!(t.arabic.get(&1).map(String::as_str), Some("Note one."));
        assert_eq!(t.roman.get("II").map(String::as_str), Some("Note two roman."));
    }

    #[test]
    fn test_repeated_key_on_page_merges() {
        let region = parse_region(&["4. First", "4. Second"]);
        assert_eq!(region.entries.len(), 2);
        let t = table_of(&region);
        assert_eq!(t.get(&FootnoteKey::Arabic(4)), Some("First Second"));
    }

    #[test]
    fn test_empty_region() {
        let region = parse_region::<&str>(&[]);
        assert_eq!(region, ParsedRegion::default());
    }
}
