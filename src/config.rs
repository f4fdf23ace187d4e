//! TOML configuration.
//!
//! Every section is optional; an empty file is a valid configuration that
//! reads `data.json` and `data.yaml` next to it, keeps history in
//! `history.json`, and serves on `127.0.0.1:3000` with the built-in
//! fallback cascade.
//!
//! ```toml
//! [corpus]
//! sources = [{ path = "data.json" }, { path = "extra.txt", format = "yaml" }]
//!
//! [history]
//! backend = "sqlite"
//! path = "data/history.sqlite"
//!
//! [server]
//! bind = "0.0.0.0:3000"
//! static_dir = "public"
//!
//! [[fallback.rules]]
//! name = "greeting"
//! keywords = ["سلام"]
//! reply = { kind = "fixed", text = "سلام!" }
//! ```
//!
//! Relative paths are resolved against the directory of the config file.
//! The `PORT` environment variable overrides the port in `server.bind`.

use anyhow::{Context, Result};
use chatran_core::FallbackRules;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fallback: FallbackRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
        }
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("data.json", None),
        SourceConfig::new("data.yaml", None),
    ]
}

/// One corpus file. Sources are concatenated in the order listed.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub format: Option<SourceFormat>,
}

impl SourceConfig {
    pub fn new(path: impl Into<PathBuf>, format: Option<SourceFormat>) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Explicit format, else inferred from the file extension.
    pub fn resolved_format(&self) -> Option<SourceFormat> {
        self.format.or_else(|| SourceFormat::from_path(&self.path))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(SourceFormat::Json),
            "yaml" | "yml" => Some(SourceFormat::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default)]
    pub backend: HistoryBackend,
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::default(),
            path: default_history_path(),
        }
    }
}

fn default_history_path() -> PathBuf {
    PathBuf::from("history.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: None,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Config {
    /// All defaults, rooted at the current directory. Used when no config
    /// file exists.
    pub fn minimal() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Resolve relative paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for source in &mut self.corpus.sources {
            source.path = resolve(base, &source.path);
        }
        self.history.path = resolve(base, &self.history.path);
        if let Some(dir) = &self.server.static_dir {
            self.server.static_dir = Some(resolve(base, dir));
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.bind = with_port(&self.server.bind, port);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            anyhow::bail!("server.bind must not be empty");
        }
        if self.history.path.as_os_str().is_empty() {
            anyhow::bail!("history.path must not be empty");
        }
        for source in &self.corpus.sources {
            if source.path.as_os_str().is_empty() {
                anyhow::bail!("corpus source path must not be empty");
            }
            if source.resolved_format().is_none() {
                anyhow::bail!(
                    "cannot infer format of corpus source '{}'; set format = \"json\" or \"yaml\"",
                    source.path.display()
                );
            }
        }
        self.fallback
            .validate()
            .context("Invalid [fallback] configuration")?;
        Ok(())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Replace the port of a `host:port` bind address.
pub fn with_port(bind: &str, port: u16) -> String {
    match bind.rsplit_once(':') {
        Some((host, _)) => format!("{}:{}", host, port),
        None => format!("{}:{}", bind, port),
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);
    config.apply_env_overrides();
    config.validate()?;

    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(path = %path.display(), "config file not found; using defaults");
        Ok(Config::minimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatran_core::{MatchMode, Responder};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.corpus.sources.len(), 2);
        assert_eq!(config.history.backend, HistoryBackend::Json);
        assert_eq!(config.history.path, PathBuf::from("history.json"));
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.fallback, FallbackRules::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_full_config() {
        let config: Config = toml::from_str(
            r#"
[corpus]
sources = [{ path = "a.json" }, { path = "b.txt", format = "yaml" }]

[history]
backend = "sqlite"
path = "h.sqlite"

[server]
bind = "0.0.0.0:8080"
static_dir = "public"

[[fallback.rules]]
name = "hi"
match = "token"
keywords = ["hi"]
reply = { kind = "fixed", text = "hello" }

[fallback.terminal]
kind = "pick"
choices = ["x", "y"]
"#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.corpus.sources[1].resolved_format(), Some(SourceFormat::Yaml));
        assert_eq!(config.history.backend, HistoryBackend::Sqlite);
        assert_eq!(config.fallback.rules.len(), 1);
        assert_eq!(config.fallback.rules[0].match_mode, MatchMode::Token);
        assert_eq!(
            config.fallback.terminal,
            Responder::Pick {
                choices: vec!["x".to_string(), "y".to_string()]
            }
        );
    }

    #[test]
    fn test_unknown_source_extension_rejected() {
        let config: Config =
            toml::from_str(r#"corpus = { sources = [{ path = "corpus.csv" }] }"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_fallback_rejected() {
        let config: Config = toml::from_str(
            r#"
[[fallback.rules]]
name = "never"
reply = { kind = "fixed", text = "x" }
"#,
        )
        .unwrap();
        let err = format!("{:#}", config.validate().unwrap_err());
        assert!(err.contains("never"), "{}", err);
    }

    #[test]
    fn test_resolve_paths_against_config_dir() {
        let mut config = Config::default();
        config.server.static_dir = Some(PathBuf::from("public"));
        config.resolve_paths(Path::new("/srv/chat"));
        assert_eq!(config.corpus.sources[0].path, PathBuf::from("/srv/chat/data.json"));
        assert_eq!(config.history.path, PathBuf::from("/srv/chat/history.json"));
        assert_eq!(config.server.static_dir, Some(PathBuf::from("/srv/chat/public")));
    }

    #[test]
    fn test_format_inference() {
        assert_eq!(SourceFormat::from_path(Path::new("x.JSON")), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::from_path(Path::new("x.yml")), Some(SourceFormat::Yaml));
        assert_eq!(SourceFormat::from_path(Path::new("x")), None);
    }

    #[test]
    fn test_with_port() {
        assert_eq!(with_port("127.0.0.1:3000", 8080), "127.0.0.1:8080");
        assert_eq!(with_port("localhost", 9), "localhost:9");
    }
}
