//! HTTP server command

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use opsdeck_server::llm::{LlmConfig, DEFAULT_API_URL};
use opsdeck_server::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "OPSDECK_BIND", default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Postgres URL; without it the server starts but data endpoints fail
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Login identity promoted to admin on first sign-in
    #[arg(long, env = "OWNER_OPEN_ID")]
    pub owner_open_id: Option<String>,

    /// Shared secret the login flow sends to /api/auth/sync
    #[arg(long, env = "OPSDECK_SYNC_SECRET", hide_env_values = true)]
    pub sync_secret: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "LLM_API_URL", default_value = DEFAULT_API_URL)]
    pub llm_api_url: String,

    /// API key for the model endpoint; chat replies fail without it
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Model sent upstream regardless of what the client asked for
    #[arg(long, env = "LLM_MODEL")]
    pub llm_model: Option<String>,

    /// Timeout for one completion request, in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 120)]
    pub llm_timeout_secs: u64,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            database_url: non_empty(self.database_url),
            owner_open_id: non_empty(self.owner_open_id),
            sync_secret: non_empty(self.sync_secret),
            llm: LlmConfig {
                api_url: self.llm_api_url,
                api_key: non_empty(self.llm_api_key),
                model_override: non_empty(self.llm_model),
                timeout: Duration::from_secs(self.llm_timeout_secs),
            },
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.into_config();
    tracing::info!("Starting opsdeck server on {}", config.bind_addr);

    // Blocks until shutdown
    run_server(config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_treated_as_unset() {
        let args = ServeArgs::parse_from([
            "serve",
            "--database-url",
            "",
            "--llm-api-key",
            "  ",
            "--llm-model",
            "gpt-4o-mini",
            "--sync-secret",
            "",
        ]);
        let config = args.into_config();

        assert!(config.database_url.is_none());
        assert!(config.llm.api_key.is_none());
        assert!(config.sync_secret.is_none());
        assert_eq!(config.llm.model_override.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.bind_addr.port(), 3030);
    }
}
