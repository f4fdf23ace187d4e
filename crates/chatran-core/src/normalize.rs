//! Persian text canonicalization.
//!
//! [`normalize`] folds superficially different spellings of the same text
//! into one form so that corpus matching and keyword rules compare equal:
//!
//! 1. Remove zero-width characters (ZWSP, ZWNJ, ZWJ).
//! 2. Remove the tatweel (kashida) elongation character.
//! 3. Unify Arabic yeh/kaf with their Persian letterforms.
//! 4. Strip harakat (short-vowel signs, tanwin, shadda, sukun) and the
//!    superscript alef.
//! 5. Collapse every run of line breaks into a single space.
//! 6. Trim surrounding whitespace and lower-case Latin substrings.
//!
//! # Example
//!
//! ```rust
//! use chatran_core::normalize::normalize;
//!
//! assert_eq!(normalize("  علي\u{200c}ك  "), "علیک");
//! assert_eq!(normalize("سَلام\nHello"), "سلام hello");
//! ```

const ZERO_WIDTH: [char; 3] = ['\u{200b}', '\u{200c}', '\u{200d}'];
const TATWEEL: char = '\u{0640}';
const ARABIC_YEH: char = '\u{064a}';
const PERSIAN_YEH: char = '\u{06cc}';
const ARABIC_KAF: char = '\u{0643}';
const PERSIAN_KAF: char = '\u{06a9}';

/// Returns true for the combining marks removed during normalization.
fn is_diacritic(c: char) -> bool {
    matches!(c, '\u{064b}'..='\u{0652}' | '\u{0670}')
}

/// Canonicalize raw user text. Always returns a string; empty in, empty out.
pub fn normalize(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    let mut in_break = false;

    for c in raw.chars() {
        if ZERO_WIDTH.contains(&c) || c == TATWEEL || is_diacritic(c) {
            continue;
        }
        if c == '\r' || c == '\n' {
            if !in_break {
                folded.push(' ');
                in_break = true;
            }
            continue;
        }
        in_break = false;
        folded.push(match c {
            ARABIC_YEH => PERSIAN_YEH,
            ARABIC_KAF => PERSIAN_KAF,
            other => other,
        });
    }

    folded.trim().to_lowercase()
}
