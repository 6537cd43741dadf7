//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C, then the pool is closed

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::db::Database;
use crate::llm::{LanguageModel, LlmConfig};

/// Origins allowed when CORS is not permissive
const LOCAL_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3030",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:3030",
    "http://127.0.0.1:5173",
];

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,

    /// Postgres URL. Without one the server still starts and every data
    /// endpoint answers 500.
    pub database_url: Option<String>,

    /// Identity that is made admin on first sign-in
    pub owner_open_id: Option<String>,

    /// Shared secret the login flow presents to `/api/auth/sync`. Without
    /// one the endpoint rejects every request.
    pub sync_secret: Option<String>,

    pub llm: LlmConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            database_url: None,
            owner_open_id: None,
            sync_secret: None,
            llm: LlmConfig::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub llm: Arc<dyn LanguageModel>,
    pub owner_open_id: Option<String>,
    pub sync_secret: Option<String>,
}

impl AppState {
    pub fn new(db: Database, llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            db,
            llm,
            owner_open_id: None,
            sync_secret: None,
        }
    }

    pub fn with_owner(mut self, owner_open_id: Option<String>) -> Self {
        self.owner_open_id = owner_open_id;
        self
    }

    pub fn with_sync_secret(mut self, sync_secret: Option<String>) -> Self {
        self.sync_secret = sync_secret;
        self
    }

    fn from_config(config: &ServerConfig) -> Self {
        if config.database_url.is_none() {
            tracing::warn!("DATABASE_URL not set; data endpoints will fail");
        }
        if config.sync_secret.is_none() {
            tracing::warn!("Sync secret not set; /api/auth/sync will reject all requests");
        }
        Self::new(
            Database::new(config.database_url.clone()),
            Arc::from(config.llm.build()),
        )
        .with_owner(config.owner_open_id.clone())
        .with_sync_secret(config.sync_secret.clone())
    }
}

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = LOCAL_ORIGINS
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router: `/health` plus everything under `/api`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(routes::agents::router())
        .merge(routes::chat::router())
        .merge(routes::metrics::router())
        .merge(routes::tasks::router())
        .merge(routes::knowledge::router())
        .merge(routes::skills::router())
        .merge(routes::auth::router());

    Router::new()
        .merge(routes::health::router())
        .nest("/api", api)
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState::from_config(&config));

    let app = build_router(state.clone())
        .layer(cors_layer(config.cors_permissive))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3030);
        assert!(!config.cors_permissive);
        assert!(config.database_url.is_none());
        assert!(config.sync_secret.is_none());
    }

    #[test]
    fn local_origins_all_parse() {
        for origin in LOCAL_ORIGINS {
            assert!(origin.parse::<HeaderValue>().is_ok(), "{origin}");
        }
    }
}
