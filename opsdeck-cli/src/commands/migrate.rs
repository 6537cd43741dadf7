//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use opsdeck_server::db::migrations;
use opsdeck_server::Database;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Postgres URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

/// Apply all migrations. Safe to run repeatedly.
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let database_url = args
        .database_url
        .filter(|url| !url.trim().is_empty())
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ~/.opsdeck/.env")?;

    let db = Database::new(Some(database_url));
    let pool = db.pool().context("Failed to create database pool")?;

    migrations::run(pool).await.context("Migration failed")?;
    db.close().await;

    tracing::info!("Schema is up to date");
    Ok(())
}
