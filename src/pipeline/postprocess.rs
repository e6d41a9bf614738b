//! Post-processing: make extracted page text safe for the output writers.
//!
//! PDF text layers carry all sorts of invisible debris: NUL padding, form
//! feeds, soft hyphens, bidi marks, private-use glyphs from symbol fonts.
//! RTF and DOCX consumers either choke on them or render boxes, so every
//! non-printable character becomes a plain space. Newlines and tabs survive.
//!
//! The replacement is strictly one character for one space: nothing is
//! deleted, merged, or reflowed, so text length in characters is preserved.

/// Replace every non-printable character in `input` with a single space.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_printable(c) { c } else { ' ' })
        .collect()
}

/// Printable, or one of the two layout characters writers understand.
pub fn is_printable(c: char) -> bool {
    match c {
        '\n' | '\t' | ' ' => true,
        c if c.is_control() => false,
        // Any other whitespace: NBSP, thin spaces, line/paragraph separators.
        c if c.is_whitespace() => false,
        '\u{00AD}'
        | '\u{061C}'
        | '\u{180E}'
        | '\u{200B}'..='\u{200F}'
        | '\u{202A}'..='\u{202E}'
        | '\u{2060}'..='\u{2064}'
        | '\u{2066}'..='\u{206F}'
        | '\u{FEFF}'
        | '\u{FFF9}'..='\u{FFFB}' => false,
        // Private use areas.
        '\u{E000}'..='\u{F8FF}' | '\u{F0000}'..='\u{10FFFF}' => false,
        _ => true,
    }
}
