//! Engine wiring: turns a [`Config`] into a ready [`Engine`].

use std::sync::Arc;

use anyhow::{Context, Result};
use chatran_core::{Cascade, Engine, HistoryLog, HistoryStore, ThreadRandom};

use crate::config::{Config, HistoryBackend};
use crate::corpus_loader::load_corpus;
use crate::history_json::JsonFileHistory;
use crate::sqlite_history::SqliteHistory;

/// Opens the configured history backend.
///
/// The JSON backend never fails here; the file is read later by
/// [`HistoryLog::open`], which treats a missing or corrupt snapshot as an
/// empty history. The SQLite backend connects and runs migrations
/// immediately.
///
/// # Returns
///
/// The boxed [`HistoryStore`], or an error if the SQLite database cannot be
/// created or opened.
pub async fn open_history_store(config: &Config) -> Result<Box<dyn HistoryStore>> {
    let path = &config.history.path;
    let store: Box<dyn HistoryStore> = match config.history.backend {
        HistoryBackend::Json => Box::new(JsonFileHistory::new(path)),
        HistoryBackend::Sqlite => Box::new(SqliteHistory::open(path).await?),
    };
    Ok(store)
}

/// Builds a ready-to-use [`Engine`] from configuration.
///
/// Loads and merges the corpus sources (skipping any that fail), compiles
/// the `[fallback]` rules, opens the history backend and seeds the log from
/// it. Replies draw randomness from [`ThreadRandom`].
///
/// # Arguments
///
/// - `config`: validated application configuration.
///
/// # Returns
///
/// The engine, or an error if the fallback rules are invalid or the history
/// backend cannot be opened.
pub async fn build_engine(config: &Config) -> Result<Engine> {
    let corpus = load_corpus(config);
    let cascade = Cascade::new(config.fallback.clone()).context("Invalid fallback rules")?;
    let store = open_history_store(config).await?;
    let history = HistoryLog::open(store).await;

    tracing::info!(
        corpus = corpus.len(),
        history = history.len(),
        backend = history.store_name(),
        "engine ready"
    );

    Ok(Engine::new(
        Arc::new(corpus),
        cascade,
        Arc::new(ThreadRandom),
        history,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use tempfile::TempDir;

    fn config_in(tmp: &TempDir, backend: HistoryBackend) -> Config {
        let mut config = Config::default();
        config.corpus.sources = vec![SourceConfig::new(tmp.path().join("data.json"), None)];
        config.history.backend = backend;
        config.history.path = tmp.path().join(match backend {
            HistoryBackend::Json => "history.json",
            HistoryBackend::Sqlite => "history.sqlite",
        });
        config
    }

    #[tokio::test]
    async fn test_history_survives_restart() {
        for backend in [HistoryBackend::Json, HistoryBackend::Sqlite] {
            let tmp = TempDir::new().unwrap();
            std::fs::write(
                tmp.path().join("data.json"),
                r#"[{"input":"سلام","output":"سلام، حالت چطوره؟"}]"#,
            )
            .unwrap();
            let config = config_in(&tmp, backend);

            let engine = build_engine(&config).await.unwrap();
            assert_eq!(engine.respond("سلام").await.response, "سلام، حالت چطوره؟");
            drop(engine);

            let engine = build_engine(&config).await.unwrap();
            let status = engine.status();
            assert_eq!(status.corpus_count, 1, "{:?}", backend);
            assert_eq!(status.history_count, 2, "{:?}", backend);
        }
    }

    #[tokio::test]
    async fn test_missing_corpus_still_builds() {
        let tmp = TempDir::new().unwrap();
        let engine = build_engine(&config_in(&tmp, HistoryBackend::Json))
            .await
            .unwrap();
        assert_eq!(engine.status().corpus_count, 0);
    }
}
