//! Corpus loading from JSON and YAML files.
//!
//! Each configured source is a file holding an array of
//! `{ input, output }` objects. Sources are read in configured order and
//! concatenated. A source that is missing, unreadable, or malformed is
//! skipped with a warning; loading itself never fails.

use anyhow::{Context, Result};
use chatran_core::{Corpus, CorpusEntry};

use crate::config::{Config, SourceConfig, SourceFormat};

/// Read and parse a single source.
pub fn read_source(source: &SourceConfig) -> Result<Vec<CorpusEntry>> {
    let format = source.resolved_format().with_context(|| {
        format!(
            "unknown corpus format for '{}' (expected .json, .yaml or .yml)",
            source.path.display()
        )
    })?;

    let content = std::fs::read_to_string(&source.path)
        .with_context(|| format!("Failed to read corpus source: {}", source.path.display()))?;

    let entries: Vec<CorpusEntry> = match format {
        SourceFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON corpus: {}", source.path.display()))?,
        SourceFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML corpus: {}", source.path.display()))?,
    };

    Ok(entries)
}

/// Load every source, skipping the ones that fail.
pub fn load_sources(sources: &[SourceConfig]) -> Corpus {
    let loaded = sources.iter().map(|source| match read_source(source) {
        Ok(entries) => {
            tracing::info!(
                source = %source.path.display(),
                entries = entries.len(),
                "corpus source loaded"
            );
            entries
        }
        Err(e) => {
            tracing::warn!(
                source = %source.path.display(),
                error = %format!("{:#}", e),
                "skipping corpus source"
            );
            Vec::new()
        }
    });
    Corpus::merge(loaded)
}

pub fn load_corpus(config: &Config) -> Corpus {
    load_sources(&config.corpus.sources)
}
