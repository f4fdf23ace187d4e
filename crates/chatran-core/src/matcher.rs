//! Keyword-overlap matcher.
//!
//! # Scoring
//!
//! The score of a corpus entry is the number of input tokens found in the
//! entry's token set. Input tokens are counted with multiplicity: an input
//! of `a a` against an entry containing `a` scores 2.
//!
//! # Selection
//!
//! Entries are scanned in corpus order and the best candidate is replaced
//! only by a strictly greater score, so ties go to the earliest entry. The
//! running best starts at 0, which means an entry must score at least 1
//! to be selected at all.

use std::collections::HashSet;

use crate::corpus::{Corpus, CorpusEntry};

/// Outcome of [`best_match`]. `entry` is `None` exactly when `score == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult<'a> {
    pub entry: Option<&'a CorpusEntry>,
    pub index: Option<usize>,
    pub score: usize,
}

impl<'a> MatchResult<'a> {
    pub fn none() -> Self {
        Self {
            entry: None,
            index: None,
            score: 0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.entry.is_some()
    }
}

/// Count the input tokens present in `target`.
pub fn score(input_tokens: &[String], target: &HashSet<String>) -> usize {
    input_tokens.iter().filter(|t| target.contains(*t)).count()
}

/// Select the best-scoring corpus entry for `input_tokens`.
pub fn best_match<'a>(input_tokens: &[String], corpus: &'a Corpus) -> MatchResult<'a> {
    if input_tokens.is_empty() {
        return MatchResult::none();
    }

    let mut best = MatchResult::none();
    for (index, (entry, tokens)) in corpus.iter_with_tokens().enumerate() {
        let s = score(input_tokens, tokens);
        if s > best.score {
            best = MatchResult {
                entry: Some(entry),
                index: Some(index),
                score: s,
            };
        }
    }
    best
}
