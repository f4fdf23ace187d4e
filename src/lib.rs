//! # Chatran
//!
//! **A small Persian conversational responder.**
//!
//! Chatran answers free text by matching it against a corpus of known
//! input/output pairs and, when nothing overlaps, by running a configurable
//! rule cascade (greeting, farewell, code request, question, analysis, and a
//! terminal sentence generator). Every exchange is appended to a persistent
//! history.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────┐   ┌──────────────┐
//! │ Corpus files │──▶│ chatran-core Engine      │──▶│ History store│
//! │ JSON / YAML  │   │ normalize → match → rules│   │ JSON / SQLite│
//! └──────────────┘   └────────────┬─────────────┘   └──────────────┘
//!                                 │
//!                      ┌──────────┴─────────┐
//!                      ▼                    ▼
//!                 ┌──────────┐        ┌──────────┐
//!                 │   CLI    │        │   HTTP   │
//!                 │(chatran) │        │  (Axum)  │
//!                 └──────────┘        └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`corpus_loader`] | Load and merge JSON/YAML corpus sources |
//! | [`history_json`] | JSON-file history backend |
//! | [`sqlite_history`] | SQLite history backend |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | History schema (idempotent) |
//! | [`app`] | Build an [`Engine`](chatran_core::Engine) from a config |
//! | [`status`] | `status` and `history` command output |
//! | [`server`] | HTTP API with CORS and optional static files |
//!
//! The matching and fallback logic itself lives in the `chatran-core` crate.

pub mod app;
pub mod config;
pub mod corpus_loader;
pub mod db;
pub mod history_json;
pub mod migrate;
pub mod server;
pub mod sqlite_history;
pub mod status;
