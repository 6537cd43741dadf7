//! Chat session and message repository
//!
//! Messages are append-only. There is no transaction around a chat turn;
//! each insert commits on its own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;
use crate::models::{MessageRole, ModelName};

macro_rules! session_columns {
    () => {
        "id, user_id, title, model_used, total_tokens_used, total_cost, message_count, \
         created_at, updated_at"
    };
}

macro_rules! message_columns {
    () => {
        "id, session_id, role, content, model, tokens_used, cost, metadata, created_at"
    };
}

/// Chat session record from database
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: i32,
    pub user_id: i32,
    pub title: Option<String>,
    pub model_used: String,
    pub total_tokens_used: i64,
    pub total_cost: f64,
    pub message_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chat message record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i32,
    pub session_id: i32,
    #[sqlx(try_from = "String")]
    pub role: MessageRole,
    pub content: String,
    pub model: Option<String>,
    pub tokens_used: Option<i64>,
    pub cost: Option<f64>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Message to append to a session
#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    pub session_id: i32,
    pub role: MessageRole,
    pub content: String,
    pub model: Option<String>,
    pub tokens_used: Option<i64>,
    pub cost: Option<f64>,
}

/// Chat repository
pub struct ChatRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ChatRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a session and return its id.
    pub async fn create_session(
        &self,
        user_id: i32,
        model_used: &ModelName,
        title: &str,
    ) -> Result<i32, DbError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO chat_sessions (user_id, model_used, title)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(model_used.as_str())
        .bind(title)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Sessions owned by a user, newest first.
    pub async fn list_sessions(&self, user_id: i32) -> Result<Vec<ChatSession>, DbError> {
        let sessions = sqlx::query_as::<_, ChatSession>(concat!(
            "SELECT ",
            session_columns!(),
            " FROM chat_sessions WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(sessions)
    }

    /// Append a message. Zero token counts and costs are stored as NULL.
    pub async fn add_message(&self, message: NewChatMessage) -> Result<ChatMessage, DbError> {
        let row = sqlx::query_as::<_, ChatMessage>(concat!(
            "INSERT INTO chat_messages (session_id, role, content, model, tokens_used, cost) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
            message_columns!()
        ))
        .bind(message.session_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.model.as_deref().filter(|m| !m.is_empty()))
        .bind(message.tokens_used.filter(|t| *t != 0))
        .bind(message.cost.filter(|c| *c != 0.0))
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Messages of a session in conversation order.
    pub async fn list_messages(&self, session_id: i32) -> Result<Vec<ChatMessage>, DbError> {
        let messages = sqlx::query_as::<_, ChatMessage>(concat!(
            "SELECT ",
            message_columns!(),
            " FROM chat_messages WHERE session_id = $1 ORDER BY created_at, id"
        ))
        .bind(session_id)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }
}
