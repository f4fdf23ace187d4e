//! The exemplar corpus: ordered input/output pairs used for matching.
//!
//! A [`Corpus`] is built once at startup and never mutated afterwards.
//! Entries keep their load order (source order, then order within a
//! source) because the matcher's tie-break depends on it. Duplicates are
//! kept as-is.

use std::collections::HashSet;

use serde::Deserialize;

use crate::tokenize::token_set;

/// A known input and the response to give when it matches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CorpusEntry {
    pub input: String,
    pub output: String,
}

impl CorpusEntry {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Read-only, ordered collection of [`CorpusEntry`] values.
///
/// The token set of each entry's `input` is computed at construction so
/// scoring does not re-tokenize the corpus on every request.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
    token_sets: Vec<HashSet<String>>,
}

impl Corpus {
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        let token_sets = entries.iter().map(|e| token_set(&e.input)).collect();
        Self {
            entries,
            token_sets,
        }
    }

    /// Concatenate several sources, preserving the order they are given in.
    pub fn merge<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Vec<CorpusEntry>>,
    {
        Self::new(sources.into_iter().flatten().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CorpusEntry> {
        self.entries.get(index)
    }

    /// Entries paired with their cached token sets, in corpus order.
    pub fn iter_with_tokens(&self) -> impl Iterator<Item = (&CorpusEntry, &HashSet<String>)> {
        self.entries.iter().zip(self.token_sets.iter())
    }
}
