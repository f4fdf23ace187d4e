//! `chatran status` and `chatran history` output.

use anyhow::Result;
use chatran_core::HistoryEntry;

use crate::app::build_engine;
use crate::config::Config;

/// Print corpus and history counts.
pub async fn run_status(config: &Config) -> Result<()> {
    let engine = build_engine(config).await?;
    let status = engine.status();

    println!("Chatran Status");
    println!("==============");
    println!();
    println!("  Corpus:      {} entries", status.corpus_count);
    for source in &config.corpus.sources {
        let state = if source.path.exists() { "found" } else { "missing" };
        println!("    {:<40} {}", source.path.display(), state);
    }
    println!();
    println!(
        "  History:     {} entries ({}: {})",
        status.history_count,
        engine.history().store_name(),
        config.history.path.display()
    );
    println!();

    Ok(())
}

/// Print the last `limit` recorded turns (all of them when `None`).
pub async fn run_history(config: &Config, limit: Option<usize>) -> Result<()> {
    let engine = build_engine(config).await?;
    let entries = match limit {
        Some(n) => engine.history().tail(n),
        None => engine.history().read_all(),
    };

    if entries.is_empty() {
        println!("No history recorded.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

/// Format epoch milliseconds as ISO 8601 (UTC, second precision).
pub fn format_time(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn format_entry(entry: &HistoryEntry) -> String {
    format!(
        "[{}] {:<4} {}",
        format_time(entry.time),
        entry.role.as_str(),
        entry.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatran_core::Role;

    #[test]
    fn test_format_entry() {
        let e = HistoryEntry::new(Role::Bot, "درود", 0);
        assert_eq!(format_entry(&e), "[1970-01-01T00:00:00Z] bot  درود");
    }
}
