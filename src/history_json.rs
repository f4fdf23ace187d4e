//! JSON-file [`HistoryStore`].
//!
//! The whole history is kept as one pretty-printed JSON array. Every save
//! writes the snapshot to a sibling `.tmp` file and renames it over the
//! target, so a crash mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chatran_core::{HistoryEntry, HistoryStore};

pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistory {
    fn name(&self) -> &str {
        "json"
    }

    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read history file: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let entries = serde_json::from_str(&content)
            .with_context(|| format!("Invalid history file: {}", self.path.display()))?;
        Ok(entries)
    }

    async fn save(&self, snapshot: &[HistoryEntry], _appended: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let body = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatran_core::Role;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileHistory::new(tmp.path().join("history.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileHistory::new(tmp.path().join("nested/dir/history.json"));
        let entries = vec![
            HistoryEntry::new(Role::User, "سلام", 1),
            HistoryEntry::new(Role::Bot, "درود", 2),
        ];
        store.save(&entries, &entries).await.unwrap();
        assert_eq!(store.load().await.unwrap(), entries);
        assert!(!store.temp_path().exists());

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"role\": \"user\""), "{}", raw);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        std::fs::write(&path, "[{").unwrap();
        assert!(JsonFileHistory::new(path).load().await.is_err());
    }
}
