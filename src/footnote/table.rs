//! The document-wide footnote table.

use crate::footnote::numeral::{roman_to_int, FootnoteKey, NumeralKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Footnote text per key, one ordered map per numbering space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteTable {
    pub arabic: BTreeMap<u32, String>,
    /// Keyed by uppercase numeral.
    pub roman: BTreeMap<String, String>,
}

impl FootnoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &FootnoteKey) -> Option<&str> {
        match key {
            FootnoteKey::Arabic(n) => self.arabic.get(n),
            FootnoteKey::Roman(s) => self.roman.get(s),
        }
        .map(String::as_str)
    }

    /// Insert `text` under `key`, or append it (single-space join) when the
    /// key already has text.
    pub fn merge(&mut self, key: FootnoteKey, text: &str) {
        match key {
            FootnoteKey::Arabic(n) => append_or_insert(self.arabic.entry(n), text),
            FootnoteKey::Roman(s) => append_or_insert(self.roman.entry(s), text),
        }
    }

    /// Append a continuation to an existing entry. Returns `false` when the
    /// key is unknown; continuations never create entries.
    pub fn append(&mut self, key: &FootnoteKey, text: &str) -> bool {
        let slot = match key {
            FootnoteKey::Arabic(n) => self.arabic.get_mut(n),
            FootnoteKey::Roman(s) => self.roman.get_mut(s),
        };
        match slot {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Highest Arabic key by value.
    pub fn last_arabic(&self) -> Option<FootnoteKey> {
        self.arabic.keys().next_back().map(|&n| FootnoteKey::Arabic(n))
    }

    /// Highest Roman key by numeric value (so `IX` beats `V`).
    pub fn last_roman(&self) -> Option<FootnoteKey> {
        self.roman
            .keys()
            .max_by_key(|k| roman_to_int(k))
            .map(|k| FootnoteKey::Roman(k.clone()))
    }

    pub fn count(&self, kind: NumeralKind) -> usize {
        match kind {
            NumeralKind::Arabic => self.arabic.len(),
            NumeralKind::Roman => self.roman.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.arabic.len() + self.roman.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arabic.is_empty() && self.roman.is_empty()
    }
}

fn append_or_insert<K: Ord>(entry: std::collections::btree_map::Entry<'_, K, String>, text: &str) {
    entry
        .and_modify(|existing| {
            existing.push(' ');
            existing.push_str(text);
        })
        .or_insert_with(|| text.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_joins_with_single_space() {
        let mut t = FootnoteTable::new();
        t.merge(FootnoteKey::Arabic(1), "First part.");
        t.merge(FootnoteKey::Arabic(1), "Second part.");
        assert_eq!(t.get(&FootnoteKey::Arabic(1)), Some("First part. Second part."));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_key_spaces_are_disjoint() {
        let mut t = FootnoteTable::new();
        t.merge(FootnoteKey::Arabic(3), "arabic three");
        t.merge(FootnoteKey::Roman("III".into()), "roman three");
        assert_eq!(t.get(&FootnoteKey::Arabic(3)), Some("arabic three"));
        assert_eq!(t.get(&FootnoteKey::Roman("III".into())), Some("roman three"));
        assert_eq!(t.count(NumeralKind::Arabic), 1);
        assert_eq!(t.count(NumeralKind::Roman), 1);
    }

    #[test]
    fn test_append_never_creates() {
        let mut t = FootnoteTable::new();
        assert!(!t.append(&FootnoteKey::Arabic(9), "orphan"));
        assert!(t.is_empty());
    }

    #[test]
    fn test_last_keys() {
        let mut t = FootnoteTable::new();
        for n in [2, 10, 3] {
            t.merge(FootnoteKey::Arabic(n), "x");
        }
        for r in ["V", "IX", "II"] {
            t.merge(FootnoteKey::Roman(r.into()), "x");
        }
        assert_eq!(t.last_arabic(), Some(FootnoteKey::Arabic(10)));
        assert_eq!(t.last_roman(), Some(FootnoteKey::Roman("IX".into())));
    }
}
