//! gitmirror - Local bare mirrors of remote git repositories
//!
//! Usage:
//!   gitmirror create <url> [--identifier <id>] [--no-fetch]
//!   gitmirror fetch <identifier>
//!   gitmirror changesets <identifier> [-n <count>]
//!   gitmirror delete <identifier>
//!   gitmirror list [--long]
//!
//! Settings come from `--config` (JSON or YAML), `GITMIRROR_*` environment
//! variables and `--storage-root`, in that order.

mod commands;
mod context;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shared::MirrorSettings;

use commands::{ChangesetsCommand, CreateCommand, DeleteCommand, FetchCommand, ListCommand};
use context::AppContext;

#[derive(Parser)]
#[command(name = "gitmirror")]
#[command(about = "gitmirror - Keep local bare mirrors of remote git repositories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (.json, .yaml or .yml)
    #[arg(short, long, global = true, env = "GITMIRROR_CONFIG")]
    config: Option<PathBuf>,

    /// Directory under which clones are created
    #[arg(long, global = true)]
    storage_root: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a remote and initialise its local clone
    Create(CreateCommand),
    /// Fetch a mirror from its remote
    Fetch(FetchCommand),
    /// Fetch a mirror and list its changesets
    Changesets(ChangesetsCommand),
    /// Remove a mirror's clone and its record
    Delete(DeleteCommand),
    /// List registered mirrors
    List(ListCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = MirrorSettings::load(cli.config.as_deref(), cli.storage_root)
        .context("Failed to load settings")?;

    shared::logging::init(cli.log_level.as_deref().unwrap_or(&settings.log_level));

    let ctx = AppContext::from_settings(settings)?;

    match cli.command {
        Commands::Create(cmd) => cmd.run(&ctx).await,
        Commands::Fetch(cmd) => cmd.run(&ctx).await,
        Commands::Changesets(cmd) => cmd.run(&ctx).await,
        Commands::Delete(cmd) => cmd.run(&ctx).await,
        Commands::List(cmd) => cmd.run(&ctx),
    }
}
