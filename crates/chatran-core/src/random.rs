//! Random-choice capability used by the fallback generators.
//!
//! The engine never owns a generator directly; it is handed a
//! [`RandomSource`] so tests can pin the output of random responders.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

/// Picks an index in `0..len`. Callers never pass `len == 0`.
pub trait RandomSource: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local RNG from `rand`. Unseeded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always picks the same index, clamped to the list length.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedRandom(pub usize);

impl RandomSource for FixedRandom {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

/// Cycles through a fixed sequence of indices (each taken modulo `len`).
#[derive(Debug)]
pub struct SequenceRandom {
    picks: Vec<usize>,
    cursor: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(picks: Vec<usize>) -> Self {
        Self {
            picks,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn pick(&self, len: usize) -> usize {
        if self.picks.is_empty() || len == 0 {
            return 0;
        }
        let at = self.cursor.fetch_add(1, Ordering::Relaxed) % self.picks.len();
        self.picks[at] % len
    }
}
