//! Reference substitution (third pass).
//!
//! Markers on a page are applied right to left. Replacing `[start, end)`
//! only shifts text to the right of `start`, and every marker still to be
//! processed lies to the left, so their offsets stay valid without any
//! bookkeeping. Pages share no state, so this pass can run per page in any
//! order.

use crate::footnote::numeral::FootnoteKey;
use crate::footnote::partition::SuperscriptMarker;
use crate::footnote::table::FootnoteTable;
use tracing::debug;

/// Inline form of a resolved reference: `" [Footnote 12: text]"`.
pub fn inline_footnote(literal: &str, text: &str) -> String {
    format!(" [Footnote {literal}: {text}]")
}

/// Result of substituting one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    /// Markers that matched a footnote and were replaced.
    pub replaced: usize,
}

/// Rewrite every resolvable marker in `body`.
///
/// Markers whose literal does not parse under their kind, that have no table
/// entry, or whose offsets do not fit `body` are left as they are.
pub fn substitute_page(
    body: &str,
    markers: &[SuperscriptMarker],
    table: &FootnoteTable,
) -> Substitution {
    let mut ordered: Vec<&SuperscriptMarker> = markers.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut text = body.to_string();
    let mut replaced = 0;

    for marker in ordered {
        let Some(key) = FootnoteKey::parse(&marker.literal, marker.kind) else {
            continue;
        };
        let Some(footnote) = table.get(&key) else {
            debug!("No footnote for reference {:?} ({})", marker.literal, marker.kind);
            continue;
        };
        if marker.start > marker.end
            || marker.end > text.len()
            || !text.is_char_boundary(marker.start)
            || !text.is_char_boundary(marker.end)
        {
            debug!(
                "Marker {:?} at {}..{} does not fit the page text",
                marker.literal, marker.start, marker.end
            );
            continue;
        }

        text.replace_range(
            marker.start..marker.end,
            &inline_footnote(&marker.literal, footnote),
        );
        replaced += 1;
    }

    Substitution { text, replaced }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footnote::numeral::NumeralKind;

    fn marker(start: usize, literal: &str, kind: NumeralKind) -> SuperscriptMarker {
        SuperscriptMarker {
            start,
            end: start + literal.len(),
            literal: literal.to_string(),
            kind,
        }
    }

    fn table() -> FootnoteTable {
        let mut t = FootnoteTable::new();
        t.merge(FootnoteKey::Arabic(1), "One.");
        t.merge(FootnoteKey::Arabic(2), "Two.");
        t.merge(FootnoteKey::Roman("IV".into()), "Four.");
        t
    }

    #[test]
    fn test_inline_format_is_exact() {
        assert_eq!(inline_footnote("iv", "x y"), " [Footnote iv: x y]");
    }

    #[test]
    fn test_replaces_all_markers_right_to_left() {
        let body = "A1 b2 c";
        let markers = vec![
            marker(1, "1", NumeralKind::Arabic),
            marker(4, "2", NumeralKind::Arabic),
        ];
        let s = substitute_page(body, &markers, &table());
        assert_eq!(s.replaced, 2);
        assert_eq!(s.text, "A [Footnote 1: One.] b [Footnote 2: Two.] c");
    }

    #[test]
    fn test_marker_order_does_not_matter() {
        let body = "A1 b2 c";
        let forward = vec![
            marker(1, "1", NumeralKind::Arabic),
            marker(4, "2", NumeralKind::Arabic),
        ];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(
            substitute_page(body, &forward, &table()),
            substitute_page(body, &backward, &table())
        );
    }

    #[test]
    fn test_prefix_before_first_marker_unchanged() {
        let body = "Intro text. Claim1 and claim2.";
        let markers = vec![
            marker(17, "1", NumeralKind::Arabic),
            marker(28, "2", NumeralKind::Arabic),
        ];
        let s = substitute_page(body, &markers, &table());
        assert_eq!(&s.text[..17], &body[..17]);
    }

    #[test]
    fn test_roman_literal_preserved_lookup_normalised() {
        let body = "See iv.";
        let s = substitute_page(body, &[marker(4, "iv", NumeralKind::Roman)], &table());
        assert_eq!(s.text, "See  [Footnote iv: Four.].");
    }

    #[test]
    fn test_unresolved_and_malformed_left_alone() {
        let body = "x9 yq z";
        let markers = vec![
            marker(1, "9", NumeralKind::Arabic),
            marker(4, "q", NumeralKind::Roman),
            SuperscriptMarker {
                start: 40,
                end: 41,
                literal: "1".into(),
                kind: NumeralKind::Arabic,
            },
        ];
        let s = substitute_page(body, &markers, &table());
        assert_eq!(s.replaced, 0);
        assert_eq!(s.text, body);
    }
}
