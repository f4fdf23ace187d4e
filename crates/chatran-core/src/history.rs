//! Append-only conversation history.
//!
//! [`HistoryLog`] keeps every turn in memory and hands the full snapshot to
//! a [`HistoryStore`] after each append. Persistence is best-effort: load
//! and save failures are logged and the conversation carries on with the
//! in-memory log.
//!
//! # Locking
//!
//! Two locks guard the log. The writer lock (async) serializes
//! append-then-save so persisted snapshots never go backwards. The entry
//! list sits behind a short-lived `RwLock` that is never held across I/O,
//! so [`HistoryLog::read_all`] and [`HistoryLog::len`] do not wait on a save.

use std::sync::{Mutex, RwLock};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "bot" => Some(Role::Bot),
            _ => None,
        }
    }
}

/// One recorded message. `time` is Unix epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
    pub time: i64,
}

impl HistoryEntry {
    pub fn new(role: Role, text: impl Into<String>, time: i64) -> Self {
        Self {
            role,
            text: text.into(),
            time,
        }
    }

    /// Entry stamped with the current wall-clock time.
    pub fn now(role: Role, text: impl Into<String>) -> Self {
        Self::new(role, text, chrono::Utc::now().timestamp_millis())
    }
}

/// Persistence collaborator for the history log.
///
/// `save` receives the complete history together with the entries the
/// current append added (always a tail of `snapshot`). Whole-file backends
/// rewrite the snapshot; row-oriented backends insert only `appended`, so
/// several processes can share one store without losing turns.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Short backend label for logs and status output.
    fn name(&self) -> &str;

    /// Load the previously persisted history, oldest first.
    async fn load(&self) -> Result<Vec<HistoryEntry>>;

    /// Persist one append.
    async fn save(&self, snapshot: &[HistoryEntry], appended: &[HistoryEntry]) -> Result<()>;
}

/// Store that keeps the last saved snapshot in memory. Used by tests.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    saved: Mutex<Vec<HistoryEntry>>,
    fail_saves: bool,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            saved: Mutex::new(entries),
            fail_saves: false,
        }
    }

    /// A store whose every `save` fails.
    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail_saves: true,
        }
    }

    pub fn saved(&self) -> Vec<HistoryEntry> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.saved())
    }

    async fn save(&self, snapshot: &[HistoryEntry], _appended: &[HistoryEntry]) -> Result<()> {
        if self.fail_saves {
            anyhow::bail!("in-memory store configured to fail");
        }
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))?;
        *saved = snapshot.to_vec();
        Ok(())
    }
}

/// In-memory append-only log backed by a [`HistoryStore`].
pub struct HistoryLog {
    entries: RwLock<Vec<HistoryEntry>>,
    writer: tokio::sync::Mutex<()>,
    store: Box<dyn HistoryStore>,
}

impl HistoryLog {
    /// Open the log, seeding it from whatever the store already holds.
    pub async fn open(store: Box<dyn HistoryStore>) -> Self {
        let entries = match store.load().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(store = store.name(), error = %e, "could not load history; starting empty");
                Vec::new()
            }
        };
        tracing::debug!(store = store.name(), count = entries.len(), "history loaded");
        Self {
            entries: RwLock::new(entries),
            writer: tokio::sync::Mutex::new(()),
            store,
        }
    }

    /// Append one entry and persist the updated history.
    pub async fn record(&self, entry: HistoryEntry) {
        self.append(vec![entry]).await;
    }

    /// Append a user message and the bot's reply as adjacent entries.
    pub async fn record_turn(&self, user: HistoryEntry, bot: HistoryEntry) {
        self.append(vec![user, bot]).await;
    }

    async fn append(&self, new_entries: Vec<HistoryEntry>) {
        let _writer = self.writer.lock().await;

        let snapshot = {
            let mut entries = match self.entries.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            entries.extend(new_entries.iter().cloned());
            entries.clone()
        };

        if let Err(e) = self.store.save(&snapshot, &new_entries).await {
            tracing::error!(store = self.store.name(), error = %e, "failed to persist history");
        }
    }

    /// All entries in insertion order.
    pub fn read_all(&self) -> Vec<HistoryEntry> {
        match self.entries.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The most recent `limit` entries, oldest first.
    pub fn tail(&self, limit: usize) -> Vec<HistoryEntry> {
        let all = self.read_all();
        let start = all.len().saturating_sub(limit);
        all[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }
}
