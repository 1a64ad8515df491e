//! # inkpad CLI
//!
//! The `inkpad` binary runs the note server and manages its database.
//!
//! ## Usage
//!
//! ```bash
//! inkpad --config ./config/inkpad.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `inkpad init` | Create the SQLite database and run schema migrations |
//! | `inkpad serve` | Start the HTTP API server and frontend |
//!
//! ## Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `LLM_API_KEY` | Credential for the generative-text API (required for AI endpoints) |
//! | `PORT` | Overrides the configured listen port |
//! | `INKPAD_DB` | Overrides the configured database path |
//! | `RUST_LOG` | Log filter (default `inkpad=info,tower_http=info`) |

mod config;
mod db;
mod error;
mod llm;
mod migrate;
mod models;
mod repo;
mod server;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// inkpad — a self-hosted note-taking server with AI-assisted summarization,
/// titling, and elaboration.
#[derive(Parser)]
#[command(
    name = "inkpad",
    about = "inkpad — a self-hosted AI-assisted note-taking server",
    version,
    long_about = "inkpad persists notes to a local SQLite database, exposes them through a JSON \
    HTTP API with a static browser frontend, and proxies summarize / generate-title / elaborate \
    prompts to an external generative-text API."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Built-in defaults apply when the file does not exist. Database,
    /// server, and LLM settings are read from this file; `PORT` and
    /// `INKPAD_DB` override it.
    #[arg(long, global = true, default_value = "./config/inkpad.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the notes table. This command is
    /// idempotent — running it multiple times is safe.
    Init,

    /// Start the HTTP server.
    ///
    /// Runs migrations if needed, binds the address from `[server].bind`
    /// (or `PORT`), and serves the JSON API plus the static frontend.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("inkpad=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
