//! # Chatran CLI (`chatran`)
//!
//! ```bash
//! chatran --config ./chatran.toml serve          # start the HTTP server
//! chatran ask "سلام"                             # one turn, recorded
//! chatran ask "کد پایتون میخوام" --dry-run       # one turn, not recorded
//! chatran status                                 # corpus and history counts
//! chatran history --limit 10                     # recent turns
//! ```
//!
//! Without a config file every command runs with the defaults described in
//! [`chatran::config`], relative to the current directory.

use chatran::{app, config, server, status};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chatran: a small Persian conversational responder.
#[derive(Parser)]
#[command(
    name = "chatran",
    about = "Chatran: corpus matching with a rule-based fallback for Persian chat",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// If the file does not exist, built-in defaults are used.
    #[arg(long, global = true, default_value = "./chatran.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve,

    /// Answer a single message and print the reply.
    Ask {
        /// The message to answer.
        message: String,

        /// Do not record the turn in the history.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show corpus and history counts.
    Status,

    /// Print recorded turns.
    History {
        /// Only show the most recent N entries.
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chatran=info".parse()?)
                .add_directive("chatran_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_minimal(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ask { message, dry_run } => {
            let engine = app::build_engine(&cfg).await?;
            let reply = if dry_run {
                engine.answer(&message)
            } else {
                engine.respond(&message).await
            };
            println!("{}", reply.response);
        }
        Commands::Status => {
            status::run_status(&cfg).await?;
        }
        Commands::History { limit } => {
            status::run_history(&cfg, limit).await?;
        }
    }

    Ok(())
}
