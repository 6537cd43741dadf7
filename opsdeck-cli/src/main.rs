//! opsdeck CLI - runs the operations dashboard API
//!
//! - `opsdeck serve`: HTTP API (agents, tasks, chat, metrics, knowledge, skills)
//! - `opsdeck migrate`: create or update the Postgres schema

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use commands::{MigrateArgs, ServeArgs};

#[derive(Parser, Debug)]
#[command(
    name = "opsdeck",
    author,
    version,
    about = "API server for the AI operations dashboard",
    long_about = "Serves agents, tasks, chat sessions and system metrics from Postgres, \
                  and proxies chat turns to an OpenAI-compatible model."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Run database migrations and exit
    Migrate(MigrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing so clap's env fallbacks see .env values
    let env_files = config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init_tracing(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    for path in &env_files {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
    }
    Ok(())
}
