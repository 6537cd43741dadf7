//! opsdeck-server: data and API layer for the AI operations dashboard
//!
//! Postgres-backed agents, tasks, chat sessions, metrics, knowledge base and
//! generated skills, served as a JSON API. Chat turns are proxied to an
//! OpenAI-compatible model.

pub mod chat;
pub mod db;
pub mod http;
pub mod llm;
pub mod models;
pub mod stats;

pub use db::{Database, DbError};
pub use http::{run_server, ServerConfig, ServerError};
pub use llm::LlmConfig;
