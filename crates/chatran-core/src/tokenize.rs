//! Word tokenizer over normalized text.
//!
//! Splits on whitespace and common Latin and Arabic-script punctuation.
//! Runs of separators never produce empty tokens.

use std::collections::HashSet;

use crate::normalize::normalize;

/// Punctuation treated as a word boundary, in addition to whitespace.
const SEPARATORS: [char; 8] = [',', '?', '\u{061f}', '!', ':', '.', '\u{061b}', '\u{060c}'];

fn is_separator(c: char) -> bool {
    c.is_whitespace() || SEPARATORS.contains(&c)
}

/// Split already-normalized text into tokens.
pub fn split_normalized(normalized: &str) -> Vec<String> {
    normalized
        .split(is_separator)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize `raw` and split it into an ordered sequence of non-empty tokens.
pub fn tokenize(raw: &str) -> Vec<String> {
    split_normalized(&normalize(raw))
}

/// Distinct tokens of `raw`, used as the target side of scoring.
pub fn token_set(raw: &str) -> HashSet<String> {
    tokenize(raw).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_persian_punctuation() {
        assert_eq!(
            tokenize("سلام، خوبی؟ آره؛ عالی!"),
            vec!["سلام", "خوبی", "آره", "عالی"]
        );
    }

    #[test]
    fn test_splits_on_latin_punctuation() {
        assert_eq!(tokenize("hi,there.you:me?"), vec!["hi", "there", "you", "me"]);
    }

    #[test]
    fn test_no_empty_tokens() {
        for s in ["", "   ", "؟؟!!", ",,a,,b,,", " . : ؛ ، ", "\n\nx\n"] {
            assert!(tokenize(s).iter().all(|t| !t.is_empty()), "{:?}", s);
        }
        assert!(tokenize("؟ ! . ،").is_empty());
    }

    #[test]
    fn test_applies_normalization() {
        assert_eq!(tokenize("كد  Python"), vec!["کد", "python"]);
    }

    #[test]
    fn test_token_set_deduplicates() {
        let set = token_set("a a b");
        assert_eq!(set.len(), 2);
        assert!(set.contains("a") && set.contains("b"));
    }
}
