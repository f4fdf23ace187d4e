//! SQLite-backed [`HistoryStore`].
//!
//! Each append inserts just the new entries, inside one transaction.
//! SQLite assigns `seq`, so several processes (a running `serve` and a
//! one-off `ask`) can append to the same database and every turn is kept,
//! in commit order.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chatran_core::{HistoryEntry, HistoryStore, Role};
use sqlx::{Row, SqlitePool};

use crate::{db, migrate};

pub struct SqliteHistory {
    pool: SqlitePool,
}

impl SqliteHistory {
    /// Connect to (or create) the database at `path` and ensure the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = db::connect(path).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl HistoryStore for SqliteHistory {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query("SELECT role, text, time FROM history ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<HistoryEntry> {
                let role: String = row.get("role");
                let role = Role::parse(&role)
                    .with_context(|| format!("unknown role in history table: {}", role))?;
                Ok(HistoryEntry {
                    role,
                    text: row.get("text"),
                    time: row.get("time"),
                })
            })
            .collect()
    }

    async fn save(&self, _snapshot: &[HistoryEntry], appended: &[HistoryEntry]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for entry in appended {
            sqlx::query("INSERT INTO history (role, text, time) VALUES (?, ?, ?)")
                .bind(entry.role.as_str())
                .bind(&entry.text)
                .bind(entry.time)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
