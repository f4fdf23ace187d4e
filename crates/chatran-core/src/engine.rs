//! The response engine: corpus match first, fallback cascade second.
//!
//! ```text
//! message ─▶ normalize ─▶ tokenize ─▶ best_match ─┬─▶ corpus output
//!                                                 └─▶ Cascade (score 0)
//! ```
//!
//! [`Engine::respond`] additionally records the user message and the reply
//! in the [`HistoryLog`]. All state is owned by the engine and injected at
//! construction; nothing is global.

use std::sync::Arc;

use crate::corpus::Corpus;
use crate::fallback::{Cascade, Utterance};
use crate::history::{HistoryEntry, HistoryLog, Role};
use crate::matcher::best_match;
use crate::normalize::normalize;
use crate::random::RandomSource;
use crate::tokenize::split_normalized;

/// Where a reply came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOrigin {
    Corpus { index: usize, score: usize },
    Fallback { rule: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub response: String,
    pub origin: ReplyOrigin,
}

/// Counts reported by the status surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub corpus_count: usize,
    pub history_count: usize,
}

pub struct Engine {
    corpus: Arc<Corpus>,
    cascade: Cascade,
    random: Arc<dyn RandomSource>,
    history: HistoryLog,
}

impl Engine {
    pub fn new(
        corpus: Arc<Corpus>,
        cascade: Cascade,
        random: Arc<dyn RandomSource>,
        history: HistoryLog,
    ) -> Self {
        Self {
            corpus,
            cascade,
            random,
            history,
        }
    }

    /// Compute a reply without recording anything.
    pub fn answer(&self, message: &str) -> Reply {
        let normalized = normalize(message);
        let tokens = split_normalized(&normalized);

        let matched = best_match(&tokens, &self.corpus);
        if let (Some(entry), Some(index)) = (matched.entry, matched.index) {
            return Reply {
                response: entry.output.clone(),
                origin: ReplyOrigin::Corpus {
                    index,
                    score: matched.score,
                },
            };
        }

        let utterance = Utterance {
            raw: message,
            normalized: &normalized,
            tokens: &tokens,
        };
        let (rule, response) = self.cascade.respond(&utterance, self.random.as_ref());
        Reply {
            response,
            origin: ReplyOrigin::Fallback {
                rule: rule.to_string(),
            },
        }
    }

    /// Compute a reply and append both sides of the turn to the history.
    pub async fn respond(&self, message: &str) -> Reply {
        let user = HistoryEntry::now(Role::User, message);
        let reply = self.answer(message);
        tracing::debug!(origin = ?reply.origin, "reply computed");
        let bot = HistoryEntry::now(Role::Bot, reply.response.clone());
        self.history.record_turn(user, bot).await;
        reply
    }

    pub fn status(&self) -> Status {
        Status {
            corpus_count: self.corpus.len(),
            history_count: self.history.len(),
        }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }
}
