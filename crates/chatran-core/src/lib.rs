//! # Chatran Core
//!
//! Pure logic for the Chatran responder: Persian text normalization,
//! tokenization, keyword-overlap matching over an exemplar corpus, the
//! configurable fallback cascade, and the append-only history log.
//!
//! This crate performs no filesystem or network I/O. Corpus loading and
//! history persistence are supplied by the application through plain data
//! ([`corpus::CorpusEntry`]) and the [`history::HistoryStore`] trait.

pub mod corpus;
pub mod engine;
pub mod fallback;
pub mod history;
pub mod matcher;
pub mod normalize;
pub mod random;
pub mod tokenize;

pub use corpus::{Corpus, CorpusEntry};
pub use engine::{Engine, Reply, ReplyOrigin, Status};
pub use fallback::{Cascade, FallbackRules, MatchMode, Responder, Rule};
pub use history::{HistoryEntry, HistoryLog, HistoryStore, InMemoryHistoryStore, Role};
pub use random::{RandomSource, ThreadRandom};
