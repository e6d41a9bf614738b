//! Numeral grammars and the footnote key type.
//!
//! Footnotes are numbered either with Arabic digits or with Roman numerals.
//! The two spaces are kept apart by construction: [`FootnoteKey`] is a tagged
//! enum, so Arabic `3` and Roman `III` can never land in the same entry.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which numbering space a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumeralKind {
    Arabic,
    Roman,
}

impl fmt::Display for NumeralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumeralKind::Arabic => f.write_str("arabic"),
            NumeralKind::Roman => f.write_str("roman"),
        }
    }
}

/// Normalised identifier of one footnote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FootnoteKey {
    Arabic(u32),
    /// Uppercase Roman numeral, e.g. `"IV"`.
    Roman(String),
}

impl FootnoteKey {
    /// Parse `token` under the given kind.
    ///
    /// Returns `None` when the token does not belong to that grammar (or an
    /// Arabic value overflows `u32`).
    pub fn parse(token: &str, kind: NumeralKind) -> Option<Self> {
        match kind {
            NumeralKind::Arabic => {
                if is_arabic_numeral(token) {
                    token.parse().ok().map(FootnoteKey::Arabic)
                } else {
                    None
                }
            }
            NumeralKind::Roman => {
                if is_roman_numeral(token) {
                    Some(FootnoteKey::Roman(token.to_ascii_uppercase()))
                } else {
                    None
                }
            }
        }
    }

    pub fn kind(&self) -> NumeralKind {
        match self {
            FootnoteKey::Arabic(_) => NumeralKind::Arabic,
            FootnoteKey::Roman(_) => NumeralKind::Roman,
        }
    }
}

impl fmt::Display for FootnoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FootnoteKey::Arabic(n) => write!(f, "{n}"),
            FootnoteKey::Roman(s) => f.write_str(s),
        }
    }
}

// ── Grammars ─────────────────────────────────────────────────────────────────

static RE_ROMAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^M{0,4}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})$").unwrap()
});

/// `true` for a non-empty, all-ASCII-digit token.
pub fn is_arabic_numeral(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `true` for a well-formed Roman numeral in either case (`"xiv"`, `"XIV"`).
///
/// Malformed letter runs such as `"IIII"` or `"VX"` are rejected.
pub fn is_roman_numeral(s: &str) -> bool {
    if s.is_empty() || !s.chars().all(|c| "IVXLCDMivxlcdm".contains(c)) {
        return false;
    }
    RE_ROMAN.is_match(&s.to_ascii_uppercase())
}

/// Classify a whole token as Arabic, Roman, or neither.
///
/// Digits and Roman letters are disjoint alphabets, so at most one grammar can
/// match.
pub fn classify(token: &str) -> Option<NumeralKind> {
    if is_arabic_numeral(token) {
        Some(NumeralKind::Arabic)
    } else if is_roman_numeral(token) {
        Some(NumeralKind::Roman)
    } else {
        None
    }
}

/// Integer value of a Roman numeral (case-insensitive). Returns 0 for input
/// containing non-Roman letters.
pub fn roman_to_int(s: &str) -> u32 {
    let values: Vec<u32> = s
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => 0,
        })
        .collect();
    if values.contains(&0) {
        return 0;
    }

    // Subtractive pairs (IV, XC) are signed; only the final sum is unsigned.
    let mut total: i64 = 0;
    for (i, &v) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(&next) if v < next => total -= i64::from(v),
            _ => total += i64::from(v),
        }
    }
    u32::try_from(total.max(0)).unwrap_or(u32::MAX)
}

// ── Line-prefix grammars ─────────────────────────────────────────────────────

static RE_ARABIC_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]+)[.\s]").unwrap());

static RE_ROMAN_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([ivxlcdmIVXLCDM]+)[.\s]").unwrap());

static RE_ARABIC_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]+)[.\s]\s*(.+)$").unwrap());

static RE_ROMAN_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([ivxlcdmIVXLCDM]+)[.\s]\s*(.+)$").unwrap());

/// Kind of numeral a line starts with (`"3. ..."`, `"iv ..."`), if any.
///
/// Used by the boundary detector, which only needs to know that a line
/// *looks like* a footnote start.
pub fn leading_numeral(line: &str) -> Option<NumeralKind> {
    if RE_ARABIC_PREFIX.is_match(line) {
        return Some(NumeralKind::Arabic);
    }
    match RE_ROMAN_PREFIX.captures(line) {
        Some(caps) if is_roman_numeral(&caps[1]) => Some(NumeralKind::Roman),
        _ => None,
    }
}

/// Split an initiating footnote line into its key and the text after the
/// numeral: `"12. See above"` → `(Arabic(12), "See above")`.
///
/// Arabic is tried first; the Roman grammar only applies when the letter run
/// is a valid numeral.
pub fn split_entry_line(line: &str) -> Option<(FootnoteKey, &str)> {
    if let Some(caps) = RE_ARABIC_ENTRY.captures(line) {
        if let Some(key) = FootnoteKey::parse(&caps[1], NumeralKind::Arabic) {
            let rest = caps.get(2).map_or("", |m| m.as_str());
            return Some((key, rest));
        }
    }
    let caps = RE_ROMAN_ENTRY.captures(line)?;
    let key = FootnoteKey::parse(&caps[1], NumeralKind::Roman)?;
    let rest = caps.get(2).map_or("", |m| m.as_str());
    Some((key, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roman_validation() {
        for ok in ["i", "iv", "IX", "xiv", "MCMXCIV", "ii"] {
            assert!(is_roman_numeral(ok), "{ok} should be valid");
        }
        for bad in ["", "IIII", "VX", "abc", "I1", "IC"] {
            assert!(!is_roman_numeral(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_roman_to_int() {
        assert_eq!(roman_to_int("iv"), 4);
        assert_eq!(roman_to_int("IX"), 9);
        assert_eq!(roman_to_int("XL"), 40);
        assert_eq!(roman_to_int("XC"), 90);
        assert_eq!(roman_to_int("MCMXCIV"), 1994);
        assert_eq!(roman_to_int("Q"), 0);
        assert!(roman_to_int("XL") < roman_to_int("L"));
    }

    #[test]
    fn test_classify_disjoint() {
        assert_eq!(classify("12"), Some(NumeralKind::Arabic));
        assert_eq!(classify("xii"), Some(NumeralKind::Roman));
        assert_eq!(classify("1a"), None);
        assert_eq!(classify("."), None);
    }

    #[test]
    fn test_key_normalisation() {
        assert_eq!(
            FootnoteKey::parse("iv", NumeralKind::Roman),
            Some(FootnoteKey::Roman("IV".into()))
        );
        assert_eq!(
            FootnoteKey::parse("007", NumeralKind::Arabic),
            Some(FootnoteKey::Arabic(7))
        );
        assert_eq!(FootnoteKey::parse("iv", NumeralKind::Arabic), None);
        assert_eq!(FootnoteKey::Roman("IV".into()).kind(), NumeralKind::Roman);
        assert_eq!(FootnoteKey::parse("99999999999", NumeralKind::Arabic), None);
    }

    #[test]
    fn test_arabic_three_and_roman_three_differ() {
        let a = FootnoteKey::parse("3", NumeralKind::Arabic).unwrap();
        let r = FootnoteKey::parse("III", NumeralKind::Roman).unwrap();
        assert_ne!(a, r);
    }

    #[test]
    fn test_leading_numeral() {
        assert_eq!(leading_numeral("1. Alpha"), Some(NumeralKind::Arabic));
        assert_eq!(leading_numeral("  12 Beta"), Some(NumeralKind::Arabic));
        assert_eq!(leading_numeral("iv. Gamma"), Some(NumeralKind::Roman));
        assert_eq!(leading_numeral("Delta 1."), None);
        assert_eq!(leading_numeral("abc. nope"), None);
        assert_eq!(leading_numeral("12"), None);
    }

    #[test]
    fn test_split_entry_line() {
        let (key, rest) = split_entry_line("1. First note.").unwrap();
        assert_eq!(key, FootnoteKey::Arabic(1));
        assert_eq!(rest, "First note.");

        let (key, rest) = split_entry_line("ii. Note two roman.").unwrap();
        assert_eq!(key, FootnoteKey::Roman("II".into()));
        assert_eq!(rest, "Note two roman.");

        assert!(split_entry_line("continuation of first note.").is_none());
        assert!(split_entry_line("3.").is_none());
    }

    #[test]
    fn test_non_ascii_digits_are_not_footnote_starts() {
        // Arabic-Indic "1." must be treated the same way by both grammars.
        let line = "\u{0661}. note";
        assert_eq!(leading_numeral(line), None);
        assert!(split_entry_line(line).is_none());
    }
}
