//! Chat endpoints
//!
//! All session and message routes require a caller. Message listing does not
//! check that the session belongs to the caller.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::chat::{self, TurnOutcome};
use crate::db::{ChatMessage, ChatRepo, ChatSession};
use crate::http::error::ApiError;
use crate::http::extractors::{CallerId, ValidId, ValidJson};
use crate::http::server::AppState;
use crate::models::{MessageContent, ModelName, SessionTitle};

/// Entry of the fixed model menu shown by the chat UI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogModel {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
    pub context_length: u32,
    pub cost_per_1k_tokens: f64,
    pub supports_vision: bool,
}

const fn entry(
    id: &'static str,
    name: &'static str,
    provider: &'static str,
    context_length: u32,
    cost_per_1k_tokens: f64,
    supports_vision: bool,
) -> CatalogModel {
    CatalogModel {
        id,
        name,
        provider,
        context_length,
        cost_per_1k_tokens,
        supports_vision,
    }
}

pub const MODEL_CATALOG: &[CatalogModel] = &[
    entry("kimi-k2", "Kimi K2", "Moonshot", 256_000, 0.0008, false),
    entry("deepseek-coder", "DeepSeek Coder", "DeepSeek", 128_000, 0.0005, false),
    entry("qwen-turbo", "Qwen Turbo", "Alibaba", 32_000, 0.0003, true),
    entry("minimax-m2", "MiniMax M2", "MiniMax", 200_000, 0.0006, false),
    entry("gpt-4-turbo", "GPT-4 Turbo", "OpenAI", 128_000, 0.001, true),
];

/// Create session request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub model_used: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: i32,
}

/// Send message request
#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub model: String,
}

/// POST /chat/sessions
async fn create_session(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    ValidJson(req): ValidJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    let model = ModelName::new(&req.model_used)?;
    let title = match req.title.as_deref().map(SessionTitle::new).transpose()?.flatten() {
        Some(title) => title.as_str().to_string(),
        None => chat::default_session_title(Utc::now()),
    };

    let session_id = ChatRepo::new(state.db.pool()?)
        .create_session(user_id, &model, &title)
        .await?;
    tracing::info!(session_id, user_id, "Chat session created");

    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}

/// GET /chat/sessions - caller's sessions, newest first
async fn list_sessions(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
) -> Result<Json<Vec<ChatSession>>, ApiError> {
    let sessions = ChatRepo::new(state.db.pool()?).list_sessions(user_id).await?;
    Ok(Json(sessions))
}

/// GET /chat/sessions/{id}/messages
async fn list_messages(
    State(state): State<Arc<AppState>>,
    CallerId(_): CallerId,
    ValidId(session_id): ValidId,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let messages = ChatRepo::new(state.db.pool()?).list_messages(session_id).await?;
    Ok(Json(messages))
}

/// POST /chat/sessions/{id}/messages - one chat turn
async fn send_message(
    State(state): State<Arc<AppState>>,
    CallerId(_): CallerId,
    ValidId(session_id): ValidId,
    ValidJson(req): ValidJson<SendMessageRequest>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let content = MessageContent::new(&req.message)?;
    let model = ModelName::new(&req.model)?;

    let repo = ChatRepo::new(state.db.pool()?);
    let outcome = chat::run_turn(&repo, state.llm.as_ref(), session_id, content, model).await?;
    Ok(Json(outcome))
}

/// GET /chat/models
async fn list_models() -> Json<&'static [CatalogModel]> {
    Json(MODEL_CATALOG)
}

/// Chat routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/sessions", get(list_sessions).post(create_session))
        .route(
            "/chat/sessions/{id}/messages",
            get(list_messages).post(send_message),
        )
        .route("/chat/models", get(list_models))
}
